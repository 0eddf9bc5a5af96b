//! Path management for newsdesk configuration files.
//!
//! ```text
//! ~/.config/newsdesk/
//! ├── config.toml          # ClientConfig
//! └── credentials.json     # access / refresh tokens (0600)
//! ```

use std::path::PathBuf;

use newsdesk_core::{NewsdeskError, Result};

const APP_DIR: &str = "newsdesk";

pub struct NewsdeskPaths;

impl NewsdeskPaths {
    /// Returns the newsdesk configuration directory (e.g. `~/.config/newsdesk/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| NewsdeskError::config("Cannot find home directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the credentials file.
    ///
    /// # Security Note
    ///
    /// The file holds bearer tokens and is written with mode 600 on Unix.
    pub fn credentials_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("credentials.json"))
    }
}
