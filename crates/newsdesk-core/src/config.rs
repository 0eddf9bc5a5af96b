//! Client configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Settings for talking to the news site API.
///
/// Every field has a default so a partial `config.toml` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base address every API path is appended to.
    pub api_base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Origin of the web front end; checkout redirect URLs are built from it.
    pub app_origin: String,
    /// Page size used for the posts window.
    pub page_size: u32,
    /// Overrides where credentials are persisted.
    pub credentials_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            app_origin: DEFAULT_APP_ORIGIN.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            credentials_path: None,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Joins an API path onto the base URL without doubling slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// URL of a front-end page, used for payment redirects.
    pub fn app_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.app_origin.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
