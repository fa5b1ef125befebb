// Generated templates must parse back into exactly the sample values.
use chrono::{TimeZone, Utc};
use docboard::context::TestContext;
use docboard::document::{self, template};
use docboard::model::{Attachment, CardDisplay, DueDate, ParsedCard, parse_paragraphs};
use std::path::PathBuf;

fn assert_sample_cards(cards: &[ParsedCard]) {
    assert_eq!(cards.len(), 2);
    let first = &cards[0];
    assert!(first.issues.is_empty(), "unexpected issues: {:?}", first.issues);
    let card = &first.record;
    assert_eq!(card.title, "Sample Card Title");
    assert_eq!(card.description, "This is the description of the card.");
    assert_eq!(card.labels, vec!["Marketing", "Urgent"]);
    assert_eq!(
        card.due,
        Some(DueDate::Specific(
            Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 0).unwrap()
        ))
    );
    assert_eq!(card.members, vec!["username1", "username2"]);
    assert_eq!(card.list.as_deref(), Some("To Do"));
    assert_eq!(card.checklist, vec!["First item", "Second item"]);
    assert_eq!(
        card.attachments,
        vec![
            Attachment::Remote("https://example.com/document.pdf".to_string()),
            Attachment::Local(PathBuf::from("/path/to/file.pdf")),
        ]
    );
    assert_eq!(card.image.as_deref(), Some("https://example.com/image.png"));

    let second = &cards[1].record;
    assert_eq!(second.title, "Second Card");
    assert_eq!(second.list.as_deref(), Some("Backlog"));
    assert_eq!(second.checklist, vec!["Draft outline", "Review with team"]);
    assert!(second.labels.is_empty());
    assert_eq!(second.due, None);
}

#[test]
fn test_docx_template_round_trip() {
    let ctx = TestContext::new();
    let written = template::generate(&ctx.root.join("sample_template.docx")).unwrap();
    assert!(written.exists());

    let paragraphs = document::load_paragraphs(&written).unwrap();
    assert_sample_cards(&parse_paragraphs(paragraphs));
}

#[test]
fn test_markdown_template_round_trip() {
    let ctx = TestContext::new();
    let written = template::generate(&ctx.root.join("cards.md")).unwrap();
    let text = std::fs::read_to_string(&written).unwrap();
    assert!(text.starts_with("# Sample Card Title\n"));

    let paragraphs = document::load_paragraphs(&written).unwrap();
    assert_sample_cards(&parse_paragraphs(paragraphs));
}

#[test]
fn test_template_without_extension_becomes_docx() {
    let ctx = TestContext::new();
    let written = template::generate(&ctx.root.join("template")).unwrap();
    assert_eq!(written.extension().and_then(|e| e.to_str()), Some("docx"));
}

#[test]
fn test_rendered_record_parses_back() {
    let cards = parse_paragraphs(template::sample_paragraphs());
    let rendered: String = cards
        .iter()
        .map(|c| c.record.to_document_string())
        .collect::<Vec<_>>()
        .join("\n");
    let reparsed = parse_paragraphs(document::markdown::paragraphs_from_str(&rendered));
    assert_sample_cards(&reparsed);
}

#[test]
fn test_unsupported_extension_is_rejected() {
    let ctx = TestContext::new();
    let path = ctx.root.join("cards.pdf");
    std::fs::write(&path, b"%PDF").unwrap();
    let err = document::load_paragraphs(&path).unwrap_err();
    assert!(err.to_string().contains("unsupported document"));
}
