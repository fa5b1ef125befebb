// Tests for turning paragraphs into card records.
use chrono::{NaiveDate, TimeZone, Utc};
use docboard::document::markdown::paragraphs_from_str;
use docboard::document::{Paragraph, ParagraphStyle};
use docboard::model::parser::match_label;
use docboard::model::{
    Attachment, CardParser, DueDate, FieldLabel, ParseIssue, parse_paragraphs,
};
use std::path::PathBuf;

fn parse_md(input: &str) -> Vec<docboard::model::ParsedCard> {
    parse_paragraphs(paragraphs_from_str(input))
}

#[test]
fn test_one_record_per_top_level_heading_in_order() {
    let cards = parse_md(
        "# First\n\n## Not a card\n\nbody\n\n# Second\n\n# Third\n\n# Second\n",
    );
    let titles: Vec<&str> = cards.iter().map(|c| c.record.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second", "Third", "Second"]);
    assert_eq!(cards[0].record.description, "Not a card\nbody");
}

#[test]
fn test_empty_heading_still_yields_a_record() {
    let paragraphs = vec![
        Paragraph::heading(""),
        Paragraph::normal("orphan description"),
        Paragraph::heading("Real"),
    ];
    let cards = parse_paragraphs(paragraphs);
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].record.title, "Untitled card");
    assert_eq!(cards[0].issues, vec![ParseIssue::EmptyTitle]);
    assert!(!cards[0].has_errors());
    assert_eq!(cards[0].record.description, "orphan description");
}

#[test]
fn test_empty_markdown_heading_still_yields_a_record() {
    let cards = parse_md("#\n\nbody\n\n# Real\n");
    let titles: Vec<&str> = cards.iter().map(|c| c.record.title.as_str()).collect();
    assert_eq!(titles, vec!["Untitled card", "Real"]);
    assert_eq!(cards[0].issues, vec![ParseIssue::EmptyTitle]);
    assert_eq!(cards[0].record.description, "body");
}

#[test]
fn test_markdown_links_become_attachments_and_cover() {
    let cards = parse_md(
        "# Card\n\nImage: [cover](https://example.com/cover.png)\n\nAttachments:\n- [brief](https://example.com/a.pdf)\n- [notes](notes/b.txt)\n",
    );
    assert_eq!(cards.len(), 1);
    assert!(!cards[0].has_errors(), "{:?}", cards[0].issues);
    let record = &cards[0].record;
    assert_eq!(record.image.as_deref(), Some("https://example.com/cover.png"));
    assert_eq!(
        record.attachments,
        vec![
            Attachment::Remote("https://example.com/a.pdf".to_string()),
            Attachment::Local(PathBuf::from("notes/b.txt")),
        ]
    );
}

#[test]
fn test_no_headings_no_records() {
    assert!(parse_md("Labels: A\n\njust text\n").is_empty());
    assert!(parse_paragraphs(Vec::new()).is_empty());
}

#[test]
fn test_labels_before_first_heading_are_ignored() {
    let cards = parse_md("Labels: Stray\n\nList: Nowhere\n\n# Card\n\nLabels: Kept\n");
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].record.labels, vec!["Kept"]);
    assert_eq!(cards[0].record.list, None);
}

#[test]
fn test_duplicate_labels_collapse() {
    let cards = parse_md("# Card\n\nLabels: A, B, B, , A\n\nLabels: C, B\n");
    assert_eq!(cards[0].record.labels, vec!["A", "B", "C"]);
}

#[test]
fn test_members_keep_order_and_drop_at_sign() {
    let cards = parse_md("# Card\n\nMembers: @alice, bob ,, @carol\n");
    assert_eq!(cards[0].record.members, vec!["alice", "bob", "carol"]);
}

#[test]
fn test_invalid_due_date_is_a_card_error() {
    let cards = parse_md("# Card\n\nDue Date: 31-12-2024\n\nList: To Do\n");
    let card = &cards[0];
    assert_eq!(card.record.due, None);
    assert_eq!(card.record.list.as_deref(), Some("To Do"));
    assert!(card.has_errors());
    assert!(matches!(
        &card.issues[0],
        ParseIssue::InvalidDueDate { value, .. } if value == "31-12-2024"
    ));
}

#[test]
fn test_due_date_variants() {
    let cards = parse_md("# A\n\nDue Date: 2024-12-31\n\n# B\n\ndue date: 2024-12-31T23:59:00Z\n");
    assert_eq!(
        cards[0].record.due,
        Some(DueDate::AllDay(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()))
    );
    assert_eq!(
        cards[1].record.due,
        Some(DueDate::Specific(
            Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap()
        ))
    );
    assert_eq!(
        cards[0].record.due.unwrap().to_api_string(),
        "2024-12-31T12:00:00.000Z"
    );
}

#[test]
fn test_label_matching_policy() {
    assert_eq!(match_label("labels: a").map(|(l, _)| l), Some(FieldLabel::Labels));
    assert_eq!(
        match_label("DUE DATE: 2024-01-01"),
        Some((FieldLabel::DueDate, "2024-01-01"))
    );
    assert_eq!(match_label("Checklist:"), Some((FieldLabel::Checklist, "")));
    assert_eq!(match_label("Labels - a"), None);
    assert_eq!(match_label("Labels : a"), None);
    assert_eq!(match_label("Label: a"), None);
    assert_eq!(match_label("Listing: a"), None);
    assert_eq!(match_label("My Labels: a"), None);
}

#[test]
fn test_description_stops_at_first_label() {
    let cards = parse_md(
        "# Card\n\nLine one\nLine two\n\n- a bullet\n\nList: Backlog\n\nstray text after fields\n",
    );
    let card = &cards[0].record;
    assert_eq!(card.description, "Line one\nLine two\n- a bullet");
    assert_eq!(card.list.as_deref(), Some("Backlog"));
}

#[test]
fn test_checklist_and_attachment_runs() {
    let cards = parse_md(
        "# Card\n\nChecklist: inline first\n\n- second\n* third\n\n1. fourth\n\n\
         Attachments:\n\nhttps://example.com/a.pdf\n\n- ./notes/b.txt\n\nList: To Do\n",
    );
    let card = &cards[0].record;
    assert_eq!(card.checklist, vec!["inline first", "second", "third", "fourth"]);
    assert_eq!(
        card.attachments,
        vec![
            Attachment::Remote("https://example.com/a.pdf".to_string()),
            Attachment::Local(PathBuf::from("./notes/b.txt")),
        ]
    );
    assert_eq!(card.list.as_deref(), Some("To Do"));
}

#[test]
fn test_checklist_ends_at_next_heading() {
    let cards = parse_md("# One\n\nChecklist:\n\n- a\n\n# Two\n\n- not an item\n");
    assert_eq!(cards[0].record.checklist, vec!["a"]);
    assert!(cards[1].record.checklist.is_empty());
    assert_eq!(cards[1].record.description, "- not an item");
}

#[test]
fn test_image_last_wins_and_non_url_is_rejected() {
    let cards = parse_md(
        "# Card\n\nImage: https://example.com/1.png\n\nImage: not-a-url\n\nImage: https://example.com/2.png\n",
    );
    let card = &cards[0];
    assert_eq!(card.record.image.as_deref(), Some("https://example.com/2.png"));
    assert_eq!(
        card.issues,
        vec![
            ParseIssue::InvalidImage {
                value: "not-a-url".to_string()
            },
            ParseIssue::ImageReplaced {
                discarded: "https://example.com/1.png".to_string()
            },
        ]
    );
}

#[test]
fn test_repeated_list_overwrites() {
    let cards = parse_md("# Card\n\nList: To Do\n\nList: Done\n");
    assert_eq!(cards[0].record.list.as_deref(), Some("Done"));
}

#[test]
fn test_parser_is_lazy() {
    let paragraphs = vec![
        Paragraph::heading("A"),
        Paragraph::new(ParagraphStyle::Normal, "desc"),
        Paragraph::heading("B"),
    ]
    .into_iter()
    .chain(std::iter::repeat_with(|| Paragraph::heading("again")));
    let first_three: Vec<String> = CardParser::new(paragraphs)
        .take(3)
        .map(|c| c.record.title)
        .collect();
    assert_eq!(first_three, vec!["A", "B", "again"]);
}
