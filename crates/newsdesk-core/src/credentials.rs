//! Durable credential storage trait.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Key of the short-lived token entry.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Key of the long-lived token entry.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Days an `access_token` entry stays readable.
pub const ACCESS_TOKEN_TTL_DAYS: i64 = 1;
/// Days a `refresh_token` entry stays readable.
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub access_token: String,
    pub refresh_token: String,
}

impl StoredCredentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredentials").finish_non_exhaustive()
    }
}

/// Persists the token pair between runs.
///
/// Implementations must never log token values.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Reads one entry. Expired or missing entries are `None`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes one entry with the expiry that belongs to its key.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes one entry; absent entries are not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Both tokens, or `None` unless both are present.
    async fn load(&self) -> Result<Option<StoredCredentials>> {
        let access = self.get(ACCESS_TOKEN_KEY).await?;
        let refresh = self.get(REFRESH_TOKEN_KEY).await?;
        Ok(match (access, refresh) {
            (Some(access_token), Some(refresh_token)) => Some(StoredCredentials {
                access_token,
                refresh_token,
            }),
            _ => None,
        })
    }

    async fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        self.set(ACCESS_TOKEN_KEY, &credentials.access_token).await?;
        self.set(REFRESH_TOKEN_KEY, &credentials.refresh_token).await
    }

    async fn clear(&self) -> Result<()> {
        self.remove(ACCESS_TOKEN_KEY).await?;
        self.remove(REFRESH_TOKEN_KEY).await
    }
}

/// Expiry in days for a credential key, `None` for keys that never expire.
pub fn ttl_days(key: &str) -> Option<i64> {
    match key {
        ACCESS_TOKEN_KEY => Some(ACCESS_TOKEN_TTL_DAYS),
        REFRESH_TOKEN_KEY => Some(REFRESH_TOKEN_TTL_DAYS),
        _ => None,
    }
}
