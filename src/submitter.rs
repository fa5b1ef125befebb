// File: ./src/submitter.rs
//! Sequential card creation.
//!
//! Cards are processed one at a time in document order. A failure belongs to the
//! card it happened on; the run always moves on to the next card.
use crate::board::{BoardContext, ResolutionWarning};
use crate::client::{BoardApi, FileUpload, NewCard};
use crate::error::{CardError, ErrorKind};
use crate::model::{Attachment, ParseIssue, ParsedCard};
use bytes::Bytes;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;

pub const DEFAULT_CHECKLIST_NAME: &str = "Checklist";

/// Shared cancellation signal, checked between cards.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Cancels on the first interrupt and exits with 130 on the second.
    ///
    /// The first interrupt future is created before this returns, so the
    /// source is armed from that point on.
    pub fn watch<F>(&self, mut next_interrupt: F) -> JoinHandle<()>
    where
        F: FnMut() -> Interrupt + Send + 'static,
    {
        let flag = self.clone();
        let first = next_interrupt();
        tokio::spawn(async move {
            first.await;
            log::warn!("Interrupted; finishing the current card (Ctrl-C again to abort)");
            flag.cancel();
            next_interrupt().await;
            log::error!("Aborted");
            std::process::exit(130);
        })
    }
}

/// Resolves on the next interrupt request.
pub type Interrupt = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Interrupt source backed by Ctrl-C. Never resolves if the handler cannot
/// be installed.
pub fn ctrl_c() -> Interrupt {
    Box::pin(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::debug!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    })
}

#[derive(Debug, Clone)]
pub struct SubmitOptions {
    pub checklist_name: String,
    /// Relative local attachment paths are resolved against this directory
    /// (normally the document's own directory).
    pub attachment_root: Option<PathBuf>,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            checklist_name: DEFAULT_CHECKLIST_NAME.to_string(),
            attachment_root: None,
        }
    }
}

/// Something worth telling the user about that did not lose data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardWarning {
    Parse(ParseIssue),
    Resolution(ResolutionWarning),
}

impl fmt::Display for CardWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardWarning::Parse(issue) => write!(f, "{}", issue),
            CardWarning::Resolution(w) => write!(f, "{}", w),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created { card_id: String, url: Option<String> },
    Failed(CardError),
    /// The run was cancelled before this card was started.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub title: String,
    pub outcome: Outcome,
    pub warnings: Vec<CardWarning>,
    /// Card-scoped errors that did not prevent creation (parse errors, follow-up failures).
    pub errors: Vec<CardError>,
}

impl SubmissionResult {
    fn skipped(title: String) -> Self {
        Self {
            title,
            outcome: Outcome::Skipped,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self.outcome, Outcome::Created { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }

    /// Created with nothing lost along the way.
    pub fn is_clean(&self) -> bool {
        self.is_created() && self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub results: Vec<SubmissionResult>,
    pub cancelled: bool,
}

impl RunReport {
    pub fn created(&self) -> usize {
        self.results.iter().filter(|r| r.is_created()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == Outcome::Skipped)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.results.iter().map(|r| r.errors.len()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.results.iter().map(|r| r.warnings.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        !self.cancelled && self.results.iter().all(SubmissionResult::is_clean)
    }

    /// 0 when every card was created cleanly, 1 when anything failed or
    /// recorded an error, 130 when the run was cancelled.
    pub fn exit_code(&self) -> i32 {
        if self.cancelled {
            130
        } else if self.is_clean() {
            0
        } else {
            1
        }
    }
}

pub struct Submitter<'a> {
    api: &'a dyn BoardApi,
    board: &'a BoardContext,
    options: SubmitOptions,
    cancel: CancelFlag,
}

impl<'a> Submitter<'a> {
    pub fn new(api: &'a dyn BoardApi, board: &'a BoardContext, options: SubmitOptions) -> Self {
        Self {
            api,
            board,
            options,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Submits every card in order. Cards still pending when cancellation is
    /// observed are reported as skipped.
    pub async fn submit_all<I>(&self, cards: I) -> RunReport
    where
        I: IntoIterator<Item = ParsedCard>,
    {
        let mut report = RunReport::default();
        for (index, parsed) in cards.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                if !report.cancelled {
                    log::warn!("Cancelled; remaining cards will not be created");
                    report.cancelled = true;
                }
                report
                    .results
                    .push(SubmissionResult::skipped(parsed.record.title));
                continue;
            }
            log::info!("[{}] Creating '{}'", index + 1, parsed.record.title);
            let result = self.submit_card(parsed).await;
            match &result.outcome {
                Outcome::Created { card_id, .. } => {
                    log::info!("[{}] Created card {}", index + 1, card_id)
                }
                Outcome::Failed(e) => log::error!("[{}] {}", index + 1, e),
                Outcome::Skipped => {}
            }
            report.results.push(result);
        }
        report
    }

    pub async fn submit_card(&self, parsed: ParsedCard) -> SubmissionResult {
        let ParsedCard { record, issues } = parsed;
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        for issue in issues {
            if issue.is_error() {
                errors.push(CardError::new(ErrorKind::Parse, issue.to_string()));
            } else {
                warnings.push(CardWarning::Parse(issue));
            }
        }

        let mut result = SubmissionResult {
            title: record.title.clone(),
            outcome: Outcome::Skipped,
            warnings,
            errors,
        };

        // --- RESOLVE ---
        let id_list = match self.board.resolve_list(record.list.as_deref()) {
            Ok((id, warning)) => {
                if let Some(w) = warning {
                    log::warn!("'{}': {}", record.title, w);
                    result.warnings.push(CardWarning::Resolution(w));
                }
                id
            }
            Err(message) => {
                result.outcome = Outcome::Failed(CardError::new(ErrorKind::Resolution, message));
                return result;
            }
        };
        let (label_ids, label_warnings) = self.board.resolve_labels(&record.labels);
        let (member_ids, member_warnings) = self.board.resolve_members(&record.members);
        for w in label_warnings.into_iter().chain(member_warnings) {
            log::warn!("'{}': {}", record.title, w);
            result.warnings.push(CardWarning::Resolution(w));
        }

        // --- CREATE ---
        let new_card = NewCard {
            name: record.title.clone(),
            desc: record.description.clone(),
            id_list,
            due: record.due.map(|d| d.to_api_string()),
            id_labels: label_ids.join(","),
            id_members: member_ids.join(","),
            pos: "bottom".to_string(),
        };
        let created = match self.api.create_card(&new_card).await {
            Ok(c) => c,
            Err(e) => {
                result.outcome = Outcome::Failed(e.into());
                return result;
            }
        };
        let card_id = created.id.clone();
        result.outcome = Outcome::Created {
            card_id: created.id,
            url: created.short_url,
        };

        // --- FOLLOW-UPS ---
        if !record.checklist.is_empty() {
            self.add_checklist(&card_id, &record.checklist, &mut result.errors)
                .await;
        }
        for attachment in &record.attachments {
            if let Err(e) = self.add_attachment(&card_id, attachment).await {
                log::warn!("'{}': attachment {}: {}", record.title, attachment, e);
                result.errors.push(e);
            }
        }
        if let Some(image) = &record.image
            && let Err(e) = self.api.attach_url(&card_id, image, true).await
        {
            let e = CardError::from(e);
            log::warn!("'{}': cover image: {}", record.title, e);
            result.errors.push(e);
        }

        result
    }

    async fn add_checklist(&self, card_id: &str, items: &[String], errors: &mut Vec<CardError>) {
        let checklist = match self
            .api
            .create_checklist(card_id, &self.options.checklist_name)
            .await
        {
            Ok(c) => c,
            Err(e) => {
                let mut e = CardError::from(e);
                e.message = format!(
                    "checklist not created, {} item(s) skipped: {}",
                    items.len(),
                    e.message
                );
                errors.push(e);
                return;
            }
        };
        for item in items {
            if let Err(e) = self.api.add_checklist_item(&checklist.id, item).await {
                let mut e = CardError::from(e);
                e.message = format!("checklist item '{}': {}", item, e.message);
                errors.push(e);
            }
        }
    }

    async fn add_attachment(&self, card_id: &str, attachment: &Attachment) -> Result<(), CardError> {
        match attachment {
            Attachment::Remote(url) => {
                self.api.attach_url(card_id, url, false).await?;
            }
            Attachment::Local(path) => {
                let path = self.resolve_local(path);
                let contents = tokio::fs::read(&path)
                    .await
                    .map_err(|e| CardError::file_access(&path, &e))?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "attachment".to_string());
                let upload = FileUpload {
                    file_name,
                    contents: Bytes::from(contents),
                };
                self.api.upload_file(card_id, upload, false).await?;
            }
        }
        Ok(())
    }

    fn resolve_local(&self, path: &Path) -> PathBuf {
        match &self.options.attachment_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}
