// File: ./src/model/card.rs
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use strum::EnumIter;

/// Field labels recognised inside a card block, in their conventional order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum FieldLabel {
    Labels,
    DueDate,
    Members,
    List,
    Checklist,
    Attachments,
    Image,
}

impl FieldLabel {
    pub fn name(&self) -> &'static str {
        match self {
            FieldLabel::Labels => "Labels",
            FieldLabel::DueDate => "Due Date",
            FieldLabel::Members => "Members",
            FieldLabel::List => "List",
            FieldLabel::Checklist => "Checklist",
            FieldLabel::Attachments => "Attachments",
            FieldLabel::Image => "Image",
        }
    }

    /// Labels whose values continue on the following lines.
    pub fn is_multiline(&self) -> bool {
        matches!(self, FieldLabel::Checklist | FieldLabel::Attachments)
    }
}

impl fmt::Display for FieldLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.name())
    }
}

// --- DATE TYPES ---

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum DueDate {
    AllDay(NaiveDate),
    Specific(DateTime<Utc>),
}

impl DueDate {
    /// Value sent to the board service.
    ///
    /// All-day dates are pinned to 12:00 UTC, which falls on the same calendar
    /// day in every time zone between UTC-11 and UTC+11.
    pub fn to_api_string(&self) -> String {
        let dt = match self {
            DueDate::AllDay(d) => d
                .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default())
                .and_utc(),
            DueDate::Specific(dt) => *dt,
        };
        dt.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueDate::AllDay(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            DueDate::Specific(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

// --- ATTACHMENTS ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// Attached by reference.
    Remote(String),
    /// Uploaded from disk at submission time.
    Local(PathBuf),
}

impl Attachment {
    pub fn classify(entry: &str) -> Self {
        if has_url_scheme(entry) {
            Attachment::Remote(entry.to_string())
        } else {
            Attachment::Local(PathBuf::from(entry))
        }
    }
}

impl fmt::Display for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attachment::Remote(url) => write!(f, "{}", url),
            Attachment::Local(path) => write!(f, "{} (upload)", path.display()),
        }
    }
}

/// True for `scheme://...` where scheme follows RFC 3986 (`[A-Za-z][A-Za-z0-9+.-]*`).
pub fn has_url_scheme(value: &str) -> bool {
    let Some((scheme, _)) = value.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
}

// --- CARD RECORD ---

pub const UNTITLED_CARD: &str = "Untitled card";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRecord {
    pub title: String,
    pub description: String,
    pub labels: Vec<String>,
    pub due: Option<DueDate>,
    pub members: Vec<String>,
    pub list: Option<String>,
    pub checklist: Vec<String>,
    pub attachments: Vec<Attachment>,
    pub image: Option<String>,
}

impl CardRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            labels: Vec::new(),
            due: None,
            members: Vec::new(),
            list: None,
            checklist: Vec::new(),
            attachments: Vec::new(),
            image: None,
        }
    }
}

/// Problems found while parsing one card block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseIssue {
    InvalidDueDate { value: String, reason: String },
    InvalidImage { value: String },
    ImageReplaced { discarded: String },
    EmptyTitle,
}

impl ParseIssue {
    /// Errors lost information from the document; the rest are notices.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            ParseIssue::InvalidDueDate { .. } | ParseIssue::InvalidImage { .. }
        )
    }
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseIssue::InvalidDueDate { value, reason } => {
                write!(f, "invalid due date '{}' ({}); due date ignored", value, reason)
            }
            ParseIssue::InvalidImage { value } => {
                write!(f, "image '{}' is not a URL; cover image ignored", value)
            }
            ParseIssue::ImageReplaced { discarded } => {
                write!(f, "several Image: entries; '{}' was replaced by a later one", discarded)
            }
            ParseIssue::EmptyTitle => write!(f, "heading has no text; using '{}'", UNTITLED_CARD),
        }
    }
}

/// Output of the parser: the record plus whatever went wrong while reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCard {
    pub record: CardRecord,
    pub issues: Vec<ParseIssue>,
}

impl ParsedCard {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ParseIssue::is_error)
    }
}
