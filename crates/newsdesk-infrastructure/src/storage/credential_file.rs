//! File-backed credential store.
//!
//! Entries are kept in one JSON document, each with its own expiry:
//!
//! ```json
//! {
//!   "access_token":  { "value": "...", "expires_at": "2024-01-02T00:00:00Z" },
//!   "refresh_token": { "value": "...", "expires_at": "2024-01-08T00:00:00Z" }
//! }
//! ```
//!
//! Expired entries read back as absent and are dropped on the next write.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use newsdesk_core::credentials::{CredentialStore, ttl_days};
use newsdesk_core::Result;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::paths::NewsdeskPaths;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    value: String,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

type Document = BTreeMap<String, Entry>;

/// Stores credentials in `credentials.json`.
///
/// # Security Note
///
/// The file is written with permissions 600 on Unix. Token values are never
/// logged.
pub struct FileCredentialStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Creates a store at the default path (`~/.config/newsdesk/credentials.json`).
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(NewsdeskPaths::credentials_file()?))
    }

    /// Creates a store at a custom path (for testing).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Document> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Document::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes via a temp file and rename so a crash never leaves half a document.
    ///
    /// The temp file is created fresh with mode 0600 before any byte is written.
    async fn write_document(&self, document: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(document)?;

        // A leftover from an interrupted write may carry a wider mode.
        match tokio::fs::remove_file(&tmp_path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&tmp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        let document = self.read_document().await?;

        Ok(document
            .get(key)
            .filter(|entry| !entry.is_expired(Utc::now()))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let now = Utc::now();

        let mut document = self.read_document().await?;
        document.retain(|_, entry| !entry.is_expired(now));
        document.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl_days(key).map(|days| now + Duration::days(days)),
            },
        );

        self.write_document(&document).await?;
        tracing::debug!("Stored credential entry '{}'", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;

        let mut document = self.read_document().await?;
        if document.remove(key).is_none() {
            return Ok(());
        }

        self.write_document(&document).await?;
        tracing::debug!("Removed credential entry '{}'", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsdesk_core::credentials::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, StoredCredentials};
    use newsdesk_core::NewsdeskError;
    use tempfile::TempDir;

    fn store_in(temp_dir: &TempDir) -> FileCredentialStore {
        FileCredentialStore::with_path(temp_dir.path().join("credentials.json"))
    }

    #[tokio::test]
    async fn test_load_from_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        assert_eq!(store.load().await.unwrap(), None);
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        let credentials = StoredCredentials::new("access-1", "refresh-1");

        store.save(&credentials).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(credentials));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entries_get_differing_expiry() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        store.save(&StoredCredentials::new("a", "r")).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let document: Document = serde_json::from_str(&raw).unwrap();
        let access_expiry = document[ACCESS_TOKEN_KEY].expires_at.unwrap();
        let refresh_expiry = document[REFRESH_TOKEN_KEY].expires_at.unwrap();

        assert_eq!((refresh_expiry - access_expiry).num_days(), 6);
        assert!(access_expiry > Utc::now() + Duration::hours(23));
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_absent() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        let json = r#"{
            "access_token": {"value": "old", "expires_at": "2000-01-01T00:00:00Z"},
            "refresh_token": {"value": "still-good", "expires_at": "2999-01-01T00:00:00Z"}
        }"#;
        std::fs::write(store.path(), json).unwrap();

        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
        assert_eq!(
            store.get(REFRESH_TOKEN_KEY).await.unwrap(),
            Some("still-good".to_string())
        );
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_missing_entry_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store.remove(ACCESS_TOKEN_KEY).await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_invalid_json_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        std::fs::write(store.path(), "{ invalid json").unwrap();

        let result = store.load().await;
        assert!(matches!(result, Err(NewsdeskError::Serialization { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_permissions_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        store.save(&StoredCredentials::new("a", "r")).await.unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_leftover_temp_file_does_not_widen_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        let tmp_path = store.path().with_extension("json.tmp");
        std::fs::write(&tmp_path, "stale").unwrap();
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o644)).unwrap();

        store.save(&StoredCredentials::new("a", "r")).await.unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!tmp_path.exists());
        assert!(store.load().await.unwrap().is_some());
    }
}
