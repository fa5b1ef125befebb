// File: ./src/document/markdown.rs
// Markdown document source (headings, list items and line-oriented paragraphs).
use crate::document::{Paragraph, ParagraphStyle};
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Builder for the block currently being read.
struct Block {
    style: ParagraphStyle,
    text: String,
    /// Text offset and destination of the open link or image.
    link: Option<(usize, String)>,
}

impl Block {
    fn new(style: ParagraphStyle) -> Self {
        Self {
            style,
            text: String::new(),
            link: None,
        }
    }

    /// A link that is the whole line, or the value after `Label:`, is
    /// replaced by its destination. Inside running text the destination
    /// is appended in parentheses. Headings keep the link text only.
    fn close_link(&mut self) {
        let Some((start, dest)) = self.link.take() else {
            return;
        };
        if let ParagraphStyle::Heading(_) = self.style {
            return;
        }
        let line_start = self.text[..start].rfind('\n').map_or(0, |i| i + 1);
        let before = self.text[line_start..start].trim();
        if before.is_empty() || before.ends_with(':') {
            self.text.truncate(start);
            self.text.push_str(&dest);
        } else if self.text[start..].trim() != dest {
            self.text.push_str(&format!(" ({})", dest));
        }
    }
}

/// Converts Markdown into paragraphs.
///
/// Every source line of a paragraph becomes its own [`Paragraph`] so that
/// `Labels: ...` and `Due Date: ...` written on consecutive lines (without a
/// blank line between them) are still separate fields. List items keep the
/// bullet/number distinction of their enclosing list.
pub fn paragraphs_from_str(input: &str) -> Vec<Paragraph> {
    let mut out = Vec::new();
    let mut lists: Vec<bool> = Vec::new(); // true = ordered
    let mut current: Option<Block> = None;

    let flush = |block: Option<Block>, out: &mut Vec<Paragraph>| {
        if let Some(block) = block {
            if let ParagraphStyle::Heading(_) = block.style {
                // One heading, one paragraph, even when it has no text.
                let title = block.text.split_whitespace().collect::<Vec<_>>().join(" ");
                out.push(Paragraph::new(block.style, title));
                return;
            }
            for line in block.text.split('\n') {
                let line = line.trim();
                // Blank lines only matter inside a description; list items are never empty.
                if line.is_empty() && block.style != ParagraphStyle::Normal {
                    continue;
                }
                out.push(Paragraph::new(block.style, line));
            }
        }
    };

    for event in Parser::new(input) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                flush(current.take(), &mut out);
                current = Some(Block::new(ParagraphStyle::Heading(heading_level(level))));
            }
            Event::Start(Tag::List(first)) => {
                flush(current.take(), &mut out);
                lists.push(first.is_some());
            }
            Event::End(TagEnd::List(_)) => {
                flush(current.take(), &mut out);
                lists.pop();
            }
            Event::Start(Tag::Item) => {
                flush(current.take(), &mut out);
                let style = match lists.last() {
                    Some(true) => ParagraphStyle::ListNumber,
                    _ => ParagraphStyle::ListBullet,
                };
                current = Some(Block::new(style));
            }
            Event::Start(Tag::Paragraph) if lists.is_empty() => {
                flush(current.take(), &mut out);
                current = Some(Block::new(ParagraphStyle::Normal));
            }
            Event::End(TagEnd::Heading(_)) | Event::End(TagEnd::Item) => {
                flush(current.take(), &mut out);
            }
            Event::End(TagEnd::Paragraph) if lists.is_empty() => {
                flush(current.take(), &mut out);
            }
            Event::Start(Tag::Link { dest_url, .. }) | Event::Start(Tag::Image { dest_url, .. }) => {
                if let Some(block) = current.as_mut() {
                    block.link = Some((block.text.len(), dest_url.to_string()));
                }
            }
            Event::End(TagEnd::Link) | Event::End(TagEnd::Image) => {
                if let Some(block) = current.as_mut() {
                    block.close_link();
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(block) = current.as_mut() {
                    block.text.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(block) = current.as_mut() {
                    block.text.push('\n');
                }
            }
            _ => {}
        }
    }
    flush(current.take(), &mut out);
    out
}

/// Renders paragraphs back to Markdown (used for templates).
pub fn paragraphs_to_string(paragraphs: &[Paragraph]) -> String {
    let mut out = String::new();
    let mut number = 0;
    let mut previous: Option<ParagraphStyle> = None;

    for p in paragraphs {
        let style = p.style;
        // A list ends at the first non-list paragraph; blank line between blocks.
        if let Some(prev) = previous
            && !(prev.is_list_item() && prev == style)
        {
            out.push('\n');
        }
        match style {
            ParagraphStyle::Heading(level) => {
                out.push_str(&"#".repeat(usize::from(level.max(1))));
                out.push(' ');
                out.push_str(&p.text);
            }
            ParagraphStyle::ListBullet => {
                out.push_str("- ");
                out.push_str(&p.text);
            }
            ParagraphStyle::ListNumber => {
                number = if previous == Some(ParagraphStyle::ListNumber) {
                    number + 1
                } else {
                    1
                };
                out.push_str(&format!("{}. {}", number, p.text));
            }
            ParagraphStyle::Normal => out.push_str(&p.text),
        }
        out.push('\n');
        previous = Some(style);
    }
    out
}
