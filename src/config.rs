// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::client::{ClientSettings, DEFAULT_API_BASE_URL, RetryPolicy};
use crate::context::AppContext;
use crate::storage::FileStore;
use crate::submitter::DEFAULT_CHECKLIST_NAME;
use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

pub const ENV_API_KEY: &str = "TRELLO_API_KEY";
pub const ENV_API_TOKEN: &str = "TRELLO_API_TOKEN";

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}
fn default_checklist_name() -> String {
    DEFAULT_CHECKLIST_NAME.to_string()
}
fn default_max_retries() -> u32 {
    2
}
fn default_retry_backoff_ms() -> u64 {
    500
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub board_url: String,
    /// List used when a card names none (or an unknown one). Falls back to the
    /// board's first list when unset.
    #[serde(default)]
    pub default_list: Option<String>,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_checklist_name")]
    pub checklist_name: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_token: String::new(),
            board_url: String::new(),
            default_list: None,
            // Match the serde defaults
            api_base_url: default_api_base_url(),
            checklist_name: default_checklist_name(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            user_agent: None,
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(cfg) => Ok(cfg),
            Err(e) if Self::is_missing_config_error(&e) => {
                log::debug!("No config file yet; using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// True when `err` means the config file does not exist, whether it is our
    /// own "not found" error or an io NotFound somewhere in the chain.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }
        err.chain().any(|cause| {
            cause
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
        })
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        FileStore::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            FileStore::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        log::debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Overrides stored credentials with `TRELLO_API_KEY` / `TRELLO_API_TOKEN`.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(key) = non_empty(ENV_API_KEY) {
            self.api_key = key;
        }
        if let Some(token) = non_empty(ENV_API_TOKEN) {
            self.api_token = token;
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.api_token.trim().is_empty()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        let mut settings = ClientSettings::new(self.api_key.trim(), self.api_token.trim());
        settings.base_url = self.api_base_url.clone();
        settings.retry = self.retry_policy();
        if let Some(ua) = self.user_agent.as_deref().filter(|s| !s.trim().is_empty()) {
            settings.user_agent = ua.to_string();
        }
        settings
    }
}
