//! Shared, observable session state.
//!
//! The gateway needs the current tokens and must be able to clear them on an
//! unrecoverable 401; the session store drives login and logout. Both hold a
//! [`SessionHandle`] onto the same watch channel.

use std::sync::Arc;

use newsdesk_core::credentials::{ACCESS_TOKEN_KEY, CredentialStore, StoredCredentials};
use newsdesk_core::session::Session;
use newsdesk_core::user::UserProfile;
use newsdesk_core::Result;
use tokio::sync::watch;

#[derive(Clone)]
pub struct SessionHandle {
    state: Arc<watch::Sender<Session>>,
    credentials: Arc<dyn CredentialStore>,
}

impl SessionHandle {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            state: Arc::new(state),
            credentials,
        }
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver that observes every session transition.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state.borrow().refresh_token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    /// Reads the durable token pair.
    pub async fn stored_credentials(&self) -> Result<Option<StoredCredentials>> {
        self.credentials.load().await
    }

    /// Installs a user and token pair together and persists the tokens.
    ///
    /// A failed write is logged; the in-memory session stays valid.
    pub async fn adopt(&self, user: UserProfile, credentials: StoredCredentials) {
        if let Err(e) = self.credentials.save(&credentials).await {
            tracing::warn!("Failed to persist credentials: {}", e);
        }

        self.state.send_modify(|session| {
            session.user = Some(user);
            session.access_token = Some(credentials.access_token);
            session.refresh_token = Some(credentials.refresh_token);
        });
    }

    /// Installs restored tokens without a user, before the profile is fetched.
    pub fn restore_tokens(&self, credentials: StoredCredentials) {
        self.state.send_modify(|session| {
            session.access_token = Some(credentials.access_token);
            session.refresh_token = Some(credentials.refresh_token);
        });
    }

    pub fn set_user(&self, user: UserProfile) {
        self.state.send_modify(|session| session.user = Some(user));
    }

    /// Replaces only the access token, in memory and on disk.
    pub async fn set_access_token(&self, access_token: String) {
        if let Err(e) = self.credentials.set(ACCESS_TOKEN_KEY, &access_token).await {
            tracing::warn!("Failed to persist refreshed access token: {}", e);
        }
        self.state
            .send_modify(|session| session.access_token = Some(access_token));
    }

    /// Drops user and tokens from memory and from the credential store.
    pub async fn clear(&self) {
        self.state.send_modify(Session::clear);
        if let Err(e) = self.credentials.clear().await {
            tracing::warn!("Failed to remove stored credentials: {}", e);
        }
    }

    pub fn mark_initialized(&self) {
        self.state.send_if_modified(|session| {
            let changed = !session.initialized;
            session.initialized = true;
            changed
        });
    }
}
