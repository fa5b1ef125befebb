// File: ./src/model/mod.rs
pub mod card;
pub mod display;
pub mod parser;

pub use card::{Attachment, CardRecord, DueDate, FieldLabel, ParseIssue, ParsedCard};
pub use display::CardDisplay;
pub use parser::{CardParser, parse_paragraphs};
