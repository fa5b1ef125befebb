// File: ./src/host.rs
//! Interaction with whoever runs the tool.
//!
//! The controller never reads stdin directly; it asks a [`Host`] for
//! credentials, the board URL and the document. `TerminalHost` prompts on the
//! terminal, `PresetHost` answers from values fixed up front.
use crate::error::RunError;
use anyhow::{Context, Result};
use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_token: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_token: api_token.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.api_token.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentChoice {
    Existing(PathBuf),
    /// No document yet: write the sample template and stop.
    GenerateTemplate,
}

pub trait Host {
    /// Returns the credentials to use. `current` holds whatever the config and
    /// environment already provide.
    fn supply_credentials(&mut self, current: &Credentials) -> Result<Credentials>;

    fn board_url(&mut self, current: Option<&str>) -> Result<String>;

    fn select_or_generate_document(&mut self) -> Result<DocumentChoice>;
}

// --- Terminal ---

pub struct TerminalHost {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
    /// Read the token with echo disabled. Off when input is not a terminal.
    hide_secrets: bool,
}

impl TerminalHost {
    pub fn stdio() -> Self {
        Self {
            input: Box::new(io::BufReader::new(io::stdin())),
            output: Box::new(io::stdout()),
            hide_secrets: true,
        }
    }

    pub fn with_io(input: Box<dyn BufRead>, output: Box<dyn Write>) -> Self {
        Self {
            input,
            output,
            hide_secrets: false,
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 {
            anyhow::bail!("input closed while waiting for an answer");
        }
        Ok(line.trim().to_string())
    }

    fn ask_secret(&mut self, prompt: &str) -> Result<String> {
        if self.hide_secrets {
            let value = rpassword::prompt_password(prompt).context("Failed to read the token")?;
            Ok(value.trim().to_string())
        } else {
            self.ask(prompt)
        }
    }

    /// Prompts for a value; an empty answer keeps `current` when there is one.
    fn ask_keeping(&mut self, label: &str, current: &str, secret: bool) -> Result<String> {
        loop {
            let prompt = match (current.is_empty(), secret) {
                (true, _) => format!("{}: ", label),
                (false, true) => format!("{} [********]: ", label),
                (false, false) => format!("{} [{}]: ", label, current),
            };
            let answer = if secret {
                self.ask_secret(&prompt)?
            } else {
                self.ask(&prompt)?
            };
            if !answer.is_empty() {
                return Ok(answer);
            }
            if !current.is_empty() {
                return Ok(current.to_string());
            }
            writeln!(self.output, "{} is required.", label)?;
        }
    }
}

impl Host for TerminalHost {
    fn supply_credentials(&mut self, current: &Credentials) -> Result<Credentials> {
        if current.is_complete() {
            return Ok(current.clone());
        }
        writeln!(
            self.output,
            "Trello API credentials are needed (https://trello.com/power-ups/admin)."
        )?;
        let api_key = self.ask_keeping("API key", &current.api_key, false)?;
        let api_token = self.ask_keeping("API token", &current.api_token, true)?;
        Ok(Credentials::new(api_key, api_token))
    }

    fn board_url(&mut self, current: Option<&str>) -> Result<String> {
        if let Some(url) = current.filter(|u| !u.trim().is_empty()) {
            return Ok(url.trim().to_string());
        }
        self.ask_keeping("Board URL", "", false)
    }

    fn select_or_generate_document(&mut self) -> Result<DocumentChoice> {
        loop {
            let answer = self.ask("Do you already have a document with your cards? [y/N]: ")?;
            if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") {
                let path = self.ask("Path to the document (.docx or .md): ")?;
                let path = path.trim_matches(|c| c == '"' || c == '\'');
                if path.is_empty() {
                    continue;
                }
                return Ok(DocumentChoice::Existing(PathBuf::from(path)));
            }
            return Ok(DocumentChoice::GenerateTemplate);
        }
    }
}

// --- Non-interactive ---

/// Answers from fixed values; anything missing is a [`RunError::MissingInput`].
#[derive(Debug, Clone, Default)]
pub struct PresetHost {
    pub credentials: Option<Credentials>,
    pub board_url: Option<String>,
    pub document: Option<PathBuf>,
}

impl Host for PresetHost {
    fn supply_credentials(&mut self, current: &Credentials) -> Result<Credentials> {
        if current.is_complete() {
            return Ok(current.clone());
        }
        match &self.credentials {
            Some(c) if c.is_complete() => Ok(c.clone()),
            _ => Err(RunError::MissingInput("API key and token").into()),
        }
    }

    fn board_url(&mut self, current: Option<&str>) -> Result<String> {
        current
            .filter(|u| !u.trim().is_empty())
            .map(|u| u.trim().to_string())
            .or_else(|| self.board_url.clone())
            .ok_or_else(|| RunError::MissingInput("board URL").into())
    }

    fn select_or_generate_document(&mut self) -> Result<DocumentChoice> {
        self.document
            .clone()
            .map(DocumentChoice::Existing)
            .ok_or_else(|| RunError::MissingInput("document path").into())
    }
}
