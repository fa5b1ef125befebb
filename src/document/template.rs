// File: ./src/document/template.rs
// Sample document generation, mirroring the format guide.
use crate::document::{DocumentFormat, Paragraph, ParagraphStyle, docx, markdown};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_TEMPLATE_NAME: &str = "sample_template";

/// The sample cards, as paragraphs. The first card uses every field, the
/// second only a list and a checklist.
pub fn sample_paragraphs() -> Vec<Paragraph> {
    vec![
        Paragraph::heading("Sample Card Title"),
        Paragraph::normal("This is the description of the card."),
        Paragraph::normal("Labels: Marketing, Urgent"),
        Paragraph::normal("Due Date: 2023-12-31T23:59:00"),
        Paragraph::normal("Members: username1, username2"),
        Paragraph::normal("List: To Do"),
        Paragraph::normal("Checklist:"),
        Paragraph::bullet("First item"),
        Paragraph::bullet("Second item"),
        Paragraph::normal("Attachments:"),
        Paragraph::normal("https://example.com/document.pdf"),
        Paragraph::normal("/path/to/file.pdf"),
        Paragraph::normal("Image: https://example.com/image.png"),
        Paragraph::heading("Second Card"),
        Paragraph::normal("Cards only need a title; every field is optional."),
        Paragraph::normal("List: Backlog"),
        Paragraph::normal("Checklist:"),
        Paragraph::new(ParagraphStyle::ListNumber, "Draft outline"),
        Paragraph::new(ParagraphStyle::ListNumber, "Review with team"),
    ]
}

/// Writes the sample template to `path`; the format follows the extension
/// (`.docx` when the path has none).
pub fn generate(path: &Path) -> Result<PathBuf> {
    let (path, format) = match DocumentFormat::from_path(path) {
        Some(format) => (path.to_path_buf(), format),
        None => (
            path.with_extension(DocumentFormat::Docx.extension()),
            DocumentFormat::Docx,
        ),
    };

    let paragraphs = sample_paragraphs();
    match format {
        DocumentFormat::Docx => docx::write_paragraphs(&path, &paragraphs)?,
        DocumentFormat::Markdown => std::fs::write(&path, markdown::paragraphs_to_string(&paragraphs))
            .with_context(|| format!("Failed to write '{}'", path.display()))?,
    }

    log::info!("Sample template written to '{}'", path.display());
    Ok(path)
}
