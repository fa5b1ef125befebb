// File: ./src/report.rs
// Human-readable per-card summary.
use crate::model::{CardDisplay, ParsedCard};
use crate::submitter::{Outcome, RunReport};
use std::fmt::Write;

pub fn format_summary(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n--- Summary ---");
    for (i, result) in report.results.iter().enumerate() {
        let status = match &result.outcome {
            Outcome::Created { url: Some(url), .. } => format!("created  {}", url),
            Outcome::Created { card_id, url: None } => format!("created  (id {})", card_id),
            Outcome::Failed(e) => format!("FAILED   {}", e),
            Outcome::Skipped => "skipped".to_string(),
        };
        let _ = writeln!(out, "{:>3}. {}: {}", i + 1, result.title, status);
        for e in &result.errors {
            let _ = writeln!(out, "       error: {}", e);
        }
        for w in &result.warnings {
            let _ = writeln!(out, "       warning: {}", w);
        }
    }
    let _ = writeln!(
        out,
        "\n{} created, {} failed, {} skipped ({} errors, {} warnings)",
        report.created(),
        report.failed(),
        report.skipped(),
        report.error_count(),
        report.warning_count()
    );
    if report.cancelled {
        let _ = writeln!(out, "Run cancelled before all cards were processed.");
    }
    out
}

/// Dry-run listing: each card as it would be created, plus its parse issues.
pub fn format_preview(cards: &[ParsedCard]) -> String {
    let mut out = String::new();
    for (i, card) in cards.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", i + 1, card.record.summary_line());
        for issue in &card.issues {
            let tag = if issue.is_error() { "error" } else { "warning" };
            let _ = writeln!(out, "       {}: {}", tag, issue);
        }
    }
    let _ = writeln!(out, "\n{} card(s) parsed; nothing was sent.", cards.len());
    out
}
