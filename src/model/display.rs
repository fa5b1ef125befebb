// File: ./src/model/display.rs
use crate::model::card::{Attachment, CardRecord, FieldLabel};

pub trait CardDisplay {
    /// One line: title plus the list it is headed to.
    fn summary_line(&self) -> String;
    /// Renders the card back into the labelled document format.
    fn to_document_string(&self) -> String;
}

impl CardDisplay for CardRecord {
    fn summary_line(&self) -> String {
        let mut line = self.title.clone();
        if let Some(list) = &self.list {
            line.push_str(&format!(" -> {}", list));
        }
        let extras = [
            (self.labels.len(), "label"),
            (self.members.len(), "member"),
            (self.checklist.len(), "checklist item"),
            (self.attachments.len(), "attachment"),
        ];
        let counts: Vec<String> = extras
            .iter()
            .filter(|(n, _)| *n > 0)
            .map(|(n, what)| format!("{} {}{}", n, what, if *n == 1 { "" } else { "s" }))
            .collect();
        if !counts.is_empty() {
            line.push_str(&format!(" [{}]", counts.join(", ")));
        }
        line
    }

    fn to_document_string(&self) -> String {
        let mut out = format!("# {}\n", self.title);
        if !self.description.is_empty() {
            out.push_str(&self.description);
            out.push('\n');
        }
        if !self.labels.is_empty() {
            out.push_str(&format!("{} {}\n", FieldLabel::Labels, self.labels.join(", ")));
        }
        if let Some(due) = &self.due {
            out.push_str(&format!("{} {}\n", FieldLabel::DueDate, due));
        }
        if !self.members.is_empty() {
            out.push_str(&format!("{} {}\n", FieldLabel::Members, self.members.join(", ")));
        }
        if let Some(list) = &self.list {
            out.push_str(&format!("{} {}\n", FieldLabel::List, list));
        }
        if !self.checklist.is_empty() {
            out.push_str(&format!("{}\n", FieldLabel::Checklist));
            for item in &self.checklist {
                out.push_str(&format!("- {}\n", item));
            }
        }
        if !self.attachments.is_empty() {
            out.push_str(&format!("{}\n", FieldLabel::Attachments));
            for attachment in &self.attachments {
                match attachment {
                    Attachment::Remote(url) => out.push_str(&format!("- {}\n", url)),
                    Attachment::Local(path) => {
                        out.push_str(&format!("- {}\n", path.display()))
                    }
                }
            }
        }
        if let Some(image) = &self.image {
            out.push_str(&format!("{} {}\n", FieldLabel::Image, image));
        }
        out
    }
}
