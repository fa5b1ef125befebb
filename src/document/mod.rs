// File: ./src/document/mod.rs
//! Document sources.
//!
//! A source turns a container file into an ordered list of [`Paragraph`]s:
//! the heading level / list structure plus plain text. The card parser only
//! ever sees paragraphs, never the container format.
pub mod docx;
pub mod markdown;
pub mod template;

use crate::error::RunError;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    /// Heading with its outline level (1 = top level).
    Heading(u8),
    ListBullet,
    ListNumber,
    Normal,
}

impl ParagraphStyle {
    pub fn is_top_heading(&self) -> bool {
        matches!(self, ParagraphStyle::Heading(1))
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self, ParagraphStyle::ListBullet | ParagraphStyle::ListNumber)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub style: ParagraphStyle,
    pub text: String,
}

impl Paragraph {
    pub fn new(style: ParagraphStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self::new(ParagraphStyle::Heading(1), text)
    }

    pub fn normal(text: impl Into<String>) -> Self {
        Self::new(ParagraphStyle::Normal, text)
    }

    pub fn bullet(text: impl Into<String>) -> Self {
        Self::new(ParagraphStyle::ListBullet, text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Docx,
    Markdown,
}

impl DocumentFormat {
    /// Picks the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "docx" => Some(DocumentFormat::Docx),
            "md" | "markdown" | "txt" => Some(DocumentFormat::Markdown),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Markdown => "md",
        }
    }
}

/// Reads the document at `path` into paragraphs.
pub fn load_paragraphs(path: &Path) -> Result<Vec<Paragraph>, RunError> {
    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| RunError::UnsupportedDocument(path.to_path_buf()))?;

    let as_run_error = |e: anyhow::Error| RunError::Document {
        path: path.to_path_buf(),
        message: format!("{:#}", e),
    };

    let paragraphs = match format {
        DocumentFormat::Docx => docx::read_paragraphs(path).map_err(as_run_error)?,
        DocumentFormat::Markdown => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| as_run_error(anyhow::Error::new(e)))?;
            markdown::paragraphs_from_str(&text)
        }
    };

    log::debug!(
        "Read {} paragraphs from '{}'",
        paragraphs.len(),
        path.display()
    );
    Ok(paragraphs)
}
