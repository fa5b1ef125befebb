// File: src/model/parser.rs
//! Document parser: paragraphs in, card records out.
//!
//! Field labels are matched at the start of a paragraph, ignoring ASCII case,
//! and must be followed directly by a colon (`labels:` and `DUE DATE:` are
//! labels, `Labels -` and `Labels :` are plain text).
use crate::document::{Paragraph, ParagraphStyle};
use crate::model::card::{
    Attachment, CardRecord, DueDate, FieldLabel, ParseIssue, ParsedCard, UNTITLED_CARD,
    has_url_scheme,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::iter::Peekable;
use strum::IntoEnumIterator;

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const OFFSET_DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M%z",
];

/// Splits `text` into a recognised label and the rest of the line.
pub fn match_label(text: &str) -> Option<(FieldLabel, &str)> {
    let text = text.trim_start();
    FieldLabel::iter().find_map(|label| {
        let name = label.name();
        let head = text.get(..name.len())?;
        let rest = text[name.len()..].strip_prefix(':')?;
        head.eq_ignore_ascii_case(name).then(|| (label, rest.trim()))
    })
}

/// Parses an ISO 8601 due date. Offset-less date-times are taken as UTC.
pub fn parse_due_date(value: &str) -> Result<DueDate, String> {
    let value = value.trim();
    let bytes = value.as_bytes();
    let iso_shaped =
        bytes.len() >= 10 && bytes[..4].iter().all(u8::is_ascii_digit) && bytes[4] == b'-';
    if !iso_shaped {
        return Err("expected YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS][offset]".to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(DueDate::Specific(dt.with_timezone(&Utc)));
    }
    // `Z` as an offset of its own, so the minute-precision forms accept it too.
    let with_offset = match value.strip_suffix(['Z', 'z']) {
        Some(rest) if rest.ends_with(|c: char| c.is_ascii_digit()) => format!("{}+00:00", rest),
        _ => value.to_string(),
    };
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&with_offset, fmt) {
            return Ok(DueDate::Specific(dt.with_timezone(&Utc)));
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(DueDate::Specific(naive.and_utc()));
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(DueDate::AllDay)
        .map_err(|e| e.to_string())
}

/// Comma-separated values, trimmed, empties dropped.
pub fn split_items(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Removes a typed bullet (`- `, `* `, `• `, `1. `, `1) `) from a line.
pub fn strip_bullet(line: &str) -> &str {
    let line = line.trim();
    for marker in ["- ", "* ", "• ", "+ "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return rest.trim_start();
        }
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0
        && let Some(rest) = line[digits..]
            .strip_prefix(". ")
            .or_else(|| line[digits..].strip_prefix(") "))
    {
        return rest.trim_start();
    }
    line
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Description,
    Values(FieldLabel),
    Fields,
}

struct CardBuilder {
    record: CardRecord,
    issues: Vec<ParseIssue>,
    description: Vec<String>,
}

impl CardBuilder {
    fn new(heading: &str) -> Self {
        let title = heading.trim();
        let mut issues = Vec::new();
        let title = if title.is_empty() {
            issues.push(ParseIssue::EmptyTitle);
            UNTITLED_CARD
        } else {
            title
        };
        Self {
            record: CardRecord::new(title),
            issues,
            description: Vec::new(),
        }
    }

    fn push_description(&mut self, p: &Paragraph) {
        let text = p.text.trim();
        let line = match p.style {
            ParagraphStyle::ListBullet => format!("- {}", text),
            ParagraphStyle::ListNumber => format!("1. {}", text),
            _ => text.to_string(),
        };
        self.description.push(line);
    }

    fn apply(&mut self, label: FieldLabel, value: &str) {
        let card = &mut self.record;
        match label {
            FieldLabel::Labels => {
                for item in split_items(value) {
                    if !card.labels.iter().any(|l| l == item) {
                        card.labels.push(item.to_string());
                    }
                }
            }
            FieldLabel::Members => {
                card.members.extend(
                    split_items(value)
                        .map(|m| m.trim_start_matches('@').trim())
                        .filter(|m| !m.is_empty())
                        .map(String::from),
                );
            }
            FieldLabel::DueDate => {
                if value.is_empty() {
                    return;
                }
                match parse_due_date(value) {
                    Ok(due) => card.due = Some(due),
                    Err(reason) => {
                        log::warn!(
                            "Card '{}': invalid due date '{}': {}",
                            card.title,
                            value,
                            reason
                        );
                        card.due = None;
                        self.issues.push(ParseIssue::InvalidDueDate {
                            value: value.to_string(),
                            reason,
                        });
                    }
                }
            }
            FieldLabel::List => {
                if !value.is_empty() {
                    card.list = Some(value.to_string());
                }
            }
            FieldLabel::Checklist | FieldLabel::Attachments => self.push_value(label, value),
            FieldLabel::Image => {
                if value.is_empty() {
                    return;
                }
                if !has_url_scheme(value) {
                    self.issues.push(ParseIssue::InvalidImage {
                        value: value.to_string(),
                    });
                } else if let Some(discarded) = card.image.replace(value.to_string()) {
                    self.issues.push(ParseIssue::ImageReplaced { discarded });
                }
            }
        }
    }

    fn push_value(&mut self, label: FieldLabel, line: &str) {
        let entry = strip_bullet(line);
        if entry.is_empty() {
            return;
        }
        match label {
            FieldLabel::Checklist => self.record.checklist.push(entry.to_string()),
            FieldLabel::Attachments => self.record.attachments.push(Attachment::classify(entry)),
            _ => {}
        }
    }

    fn finish(mut self) -> ParsedCard {
        self.record.description = self.description.join("\n").trim().to_string();
        ParsedCard {
            record: self.record,
            issues: self.issues,
        }
    }
}

/// Lazily turns a paragraph stream into cards, one per top-level heading.
pub struct CardParser<I: Iterator<Item = Paragraph>> {
    paragraphs: Peekable<I>,
}

impl<I: Iterator<Item = Paragraph>> CardParser<I> {
    pub fn new<P>(paragraphs: P) -> Self
    where
        P: IntoIterator<Item = Paragraph, IntoIter = I>,
    {
        Self {
            paragraphs: paragraphs.into_iter().peekable(),
        }
    }
}

impl<I: Iterator<Item = Paragraph>> Iterator for CardParser<I> {
    type Item = ParsedCard;

    fn next(&mut self) -> Option<ParsedCard> {
        // Anything before the first heading has no card to belong to.
        let heading = loop {
            let p = self.paragraphs.next()?;
            if p.style.is_top_heading() {
                break p;
            }
            if !p.text.trim().is_empty() {
                log::debug!("Ignoring text outside of any card: '{}'", p.text);
            }
        };

        let mut card = CardBuilder::new(&heading.text);
        let mut section = Section::Description;

        while let Some(p) = self.paragraphs.next_if(|p| !p.style.is_top_heading()) {
            if let Some((label, value)) = match_label(&p.text) {
                card.apply(label, value);
                section = if label.is_multiline() {
                    Section::Values(label)
                } else {
                    Section::Fields
                };
                continue;
            }
            match section {
                Section::Description => card.push_description(&p),
                Section::Values(label) => card.push_value(label, &p.text),
                Section::Fields => {
                    if !p.text.trim().is_empty() {
                        log::debug!(
                            "Card '{}': ignoring unlabelled text '{}'",
                            card.record.title,
                            p.text
                        );
                    }
                }
            }
        }

        Some(card.finish())
    }
}

/// Eager convenience wrapper around [`CardParser`].
pub fn parse_paragraphs(paragraphs: Vec<Paragraph>) -> Vec<ParsedCard> {
    CardParser::new(paragraphs).collect()
}
