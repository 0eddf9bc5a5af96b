//! Loads [`ClientConfig`] from `config.toml` and the environment.
//!
//! Priority: environment > config file > defaults. `NEWSDESK_*` variables
//! override the file for a single invocation.

use std::path::{Path, PathBuf};

use newsdesk_core::config::ClientConfig;
use newsdesk_core::{NewsdeskError, Result};
use serde::Deserialize;

use crate::paths::NewsdeskPaths;

pub const ENV_API_URL: &str = "NEWSDESK_API_URL";
pub const ENV_APP_ORIGIN: &str = "NEWSDESK_APP_ORIGIN";
pub const ENV_TIMEOUT_SECS: &str = "NEWSDESK_TIMEOUT_SECS";

/// `config.toml` as written by the user: every key optional.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    api_base_url: Option<String>,
    timeout_secs: Option<u64>,
    app_origin: Option<String>,
    page_size: Option<u32>,
    credentials_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Uses the default `~/.config/newsdesk/config.toml`.
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: NewsdeskPaths::config_file()?,
        })
    }

    /// Creates a ConfigService reading a custom path (for testing).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves the configuration from the file and the process environment.
    pub fn load(&self) -> Result<ClientConfig> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with an injectable environment lookup.
    pub fn load_with_env<F>(&self, env: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = self.read_file()?;
        let defaults = ClientConfig::default();

        let timeout_from_env = match env(ENV_TIMEOUT_SECS) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                NewsdeskError::config(format!("{} must be a number of seconds, got '{}'", ENV_TIMEOUT_SECS, raw))
            })?),
            None => None,
        };

        let config = ClientConfig {
            api_base_url: env(ENV_API_URL)
                .or(file.api_base_url)
                .unwrap_or(defaults.api_base_url),
            timeout_secs: timeout_from_env
                .or(file.timeout_secs)
                .unwrap_or(defaults.timeout_secs),
            app_origin: env(ENV_APP_ORIGIN)
                .or(file.app_origin)
                .unwrap_or(defaults.app_origin),
            page_size: file.page_size.unwrap_or(defaults.page_size),
            credentials_path: file.credentials_path,
        };

        tracing::debug!(
            "Resolved config: api_base_url={}, timeout={}s",
            config.api_base_url,
            config.timeout_secs
        );

        Ok(config)
    }

    fn read_file(&self) -> Result<ConfigFile> {
        if !self.path.exists() {
            return Ok(ConfigFile::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }
}
