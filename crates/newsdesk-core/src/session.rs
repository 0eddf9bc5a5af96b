//! Client-side session: the signed-in user plus the token pair.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::credentials::StoredCredentials;
use crate::user::UserProfile;

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<UserProfile>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Set once startup restoration has finished, successfully or not.
    pub initialized: bool,
}

impl Session {
    /// True only when both an access token and a user are held.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.user.is_some()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Both tokens, if the session holds a complete pair.
    pub fn credentials(&self) -> Option<StoredCredentials> {
        match (&self.access_token, &self.refresh_token) {
            (Some(access), Some(refresh)) => Some(StoredCredentials::new(access, refresh)),
            _ => None,
        }
    }

    /// Drops user and tokens; `initialized` is kept.
    pub fn clear(&mut self) {
        self.user = None;
        self.access_token = None;
        self.refresh_token = None;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user.as_ref().map(|u| &u.username))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("initialized", &self.initialized)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::sample_user;

    #[test]
    fn test_authenticated_needs_token_and_user() {
        let mut session = Session::default();
        assert!(!session.is_authenticated());

        session.access_token = Some("a".to_string());
        assert!(!session.is_authenticated());

        session.user = Some(sample_user(1, "ivan"));
        assert!(session.is_authenticated());

        session.initialized = true;
        session.clear();
        assert!(!session.is_authenticated());
        assert!(session.initialized);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let session = Session {
            access_token: Some("secret-access".to_string()),
            refresh_token: Some("secret-refresh".to_string()),
            ..Session::default()
        };
        let printed = format!("{:?}", session);
        assert!(!printed.contains("secret-access"));
        assert!(!printed.contains("secret-refresh"));
    }
}
