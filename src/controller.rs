// File: src/controller.rs
//! Run pipeline: document -> parsed cards -> board -> submission report.
//!
//! Every fatal condition is raised before the first card is sent. Once
//! submission starts, failures are card-scoped and end up in the report.
use crate::board::{BoardContext, extract_board_ref};
use crate::client::{BoardApi, BoardClient};
use crate::config::Config;
use crate::context::AppContext;
use crate::document::{self, DocumentFormat, template};
use crate::host::{Credentials, DocumentChoice, Host};
use crate::model::{CardParser, ParsedCard};
use crate::submitter::{CancelFlag, Interrupt, RunReport, SubmitOptions, Submitter};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Values given on the command line. `None` means "ask the host / use the config".
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub document: Option<PathBuf>,
    pub board_url: Option<String>,
    pub default_list: Option<String>,
    /// Write the sample template here instead of reading a document.
    pub template_path: Option<PathBuf>,
    pub dry_run: bool,
    /// Persist credentials and board URL after the board was verified.
    pub save_config: bool,
}

#[derive(Debug)]
pub enum RunOutcome {
    TemplateGenerated(PathBuf),
    /// The document has no top-level heading, so nothing was sent.
    NoCards(PathBuf),
    DryRun(Vec<ParsedCard>),
    Submitted(RunReport),
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::TemplateGenerated(_) | RunOutcome::NoCards(_) => 0,
            RunOutcome::DryRun(cards) => i32::from(cards.iter().any(ParsedCard::has_errors)),
            RunOutcome::Submitted(report) => report.exit_code(),
        }
    }
}

type InterruptSource = Box<dyn FnMut() -> Interrupt + Send>;

pub struct Controller<'a> {
    ctx: &'a dyn AppContext,
    host: &'a mut dyn Host,
    cancel: CancelFlag,
    interrupts: Option<InterruptSource>,
}

impl<'a> Controller<'a> {
    pub fn new(ctx: &'a dyn AppContext, host: &'a mut dyn Host) -> Self {
        Self {
            ctx,
            host,
            cancel: CancelFlag::new(),
            interrupts: None,
        }
    }

    /// Interrupts raise the cancel flag while cards are being submitted.
    /// Prompts and board lookups before that keep the default handling.
    pub fn with_interrupts<F>(mut self, source: F) -> Self
    where
        F: FnMut() -> Interrupt + Send + 'static,
    {
        self.interrupts = Some(Box::new(source));
        self
    }

    /// Runs against the real board service configured in `config.toml`.
    pub async fn run(&mut self, request: &RunRequest) -> Result<RunOutcome> {
        self.run_with(request, |config| {
            let client = BoardClient::new(&config.client_settings())?;
            Ok(Arc::new(client) as Arc<dyn BoardApi>)
        })
        .await
    }

    /// Runs with a caller-supplied board service, built once credentials are known.
    pub async fn run_with<F>(&mut self, request: &RunRequest, connect: F) -> Result<RunOutcome>
    where
        F: FnOnce(&Config) -> Result<Arc<dyn BoardApi>>,
    {
        let stored = Config::load_or_default(self.ctx)?;
        let mut effective = stored.clone();
        effective.apply_env();

        // --- 1. DOCUMENT ---
        let choice = match (&request.document, &request.template_path) {
            (Some(path), _) => DocumentChoice::Existing(path.clone()),
            (None, Some(_)) => DocumentChoice::GenerateTemplate,
            (None, None) => self.host.select_or_generate_document()?,
        };
        let document_path = match choice {
            DocumentChoice::Existing(path) => path,
            DocumentChoice::GenerateTemplate => {
                let target = match &request.template_path {
                    Some(p) => p.clone(),
                    None => std::env::current_dir()?
                        .join(template::DEFAULT_TEMPLATE_NAME)
                        .with_extension(DocumentFormat::Docx.extension()),
                };
                let written = template::generate(&target)?;
                return Ok(RunOutcome::TemplateGenerated(written));
            }
        };

        let paragraphs = document::load_paragraphs(&document_path)?;
        let cards: Vec<ParsedCard> = CardParser::new(paragraphs).collect();
        log::info!(
            "Parsed {} card(s) from '{}'",
            cards.len(),
            document_path.display()
        );

        if cards.is_empty() {
            log::warn!(
                "No cards found in '{}'; each card starts with a top-level heading (Heading 1 or '#')",
                document_path.display()
            );
            return Ok(RunOutcome::NoCards(document_path));
        }

        if request.dry_run {
            return Ok(RunOutcome::DryRun(cards));
        }

        // --- 2. CREDENTIALS & BOARD ---
        let current = Credentials::new(effective.api_key.clone(), effective.api_token.clone());
        let credentials = self.host.supply_credentials(&current)?;
        effective.api_key = credentials.api_key.clone();
        effective.api_token = credentials.api_token.clone();

        let configured_url = request
            .board_url
            .as_deref()
            .or(Some(effective.board_url.as_str()));
        let board_url = self.host.board_url(configured_url)?;
        let board_ref = extract_board_ref(&board_url)?;
        effective.board_url = board_url;

        if let Some(list) = &request.default_list {
            effective.default_list = Some(list.clone());
        }

        let api = connect(&effective)?;
        let board =
            BoardContext::build(api.as_ref(), &board_ref, effective.default_list.as_deref())
                .await?;

        if request.save_config {
            self.save_verified(stored, &current, &credentials, &effective.board_url);
        }

        // --- 3. SUBMIT ---
        let attachment_root = document_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf());
        let options = SubmitOptions {
            checklist_name: effective.checklist_name.clone(),
            attachment_root,
        };
        let submitter = Submitter::new(api.as_ref(), &board, options)
            .with_cancel_flag(self.cancel.clone());
        let watcher = self.interrupts.take().map(|source| self.cancel.watch(source));
        let report = submitter.submit_all(cards).await;
        if let Some(watcher) = watcher {
            watcher.abort();
        }
        Ok(RunOutcome::Submitted(report))
    }

    /// Writes back what the host supplied. Values that only came from the
    /// environment stay out of the file.
    fn save_verified(
        &self,
        mut stored: Config,
        before_prompt: &Credentials,
        credentials: &Credentials,
        board_url: &str,
    ) {
        let mut changed = false;
        if credentials.api_key != before_prompt.api_key {
            stored.api_key = credentials.api_key.clone();
            changed = true;
        }
        if credentials.api_token != before_prompt.api_token {
            stored.api_token = credentials.api_token.clone();
            changed = true;
        }
        if stored.board_url != board_url {
            stored.board_url = board_url.to_string();
            changed = true;
        }
        if !changed {
            return;
        }
        match stored.save(self.ctx) {
            Ok(()) => match self.ctx.get_config_file_path() {
                Ok(path) => log::info!("Saved credentials and board URL to {}", path.display()),
                Err(_) => log::info!("Saved credentials and board URL for next time"),
            },
            Err(e) => log::warn!("Could not save configuration: {:#}", e),
        }
    }
}
