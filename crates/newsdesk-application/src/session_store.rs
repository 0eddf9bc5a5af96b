//! Authentication state: login, logout, restoration and profile updates.

use std::sync::Arc;

use newsdesk_core::comment::Comment;
use newsdesk_core::credentials::StoredCredentials;
use newsdesk_core::post::Post;
use newsdesk_core::session::Session;
use newsdesk_core::user::{
    self, ChangePasswordRequest, LoginRequest, ProfileUpdate, RegisterRequest, UserProfile,
};
use newsdesk_core::Result;
use newsdesk_interaction::api::AuthApi;
use newsdesk_interaction::{ApiGateway, RetryPolicy, SessionHandle};
use tokio::sync::{Mutex, watch};

pub struct SessionStore {
    session: SessionHandle,
    gateway: Arc<ApiGateway>,
    auth: AuthApi,
    /// Serializes concurrent `initialize` calls.
    init_lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self {
            session: gateway.session().clone(),
            auth: AuthApi::new(gateway.clone()),
            gateway,
            init_lock: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.session.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.session.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_initialized()
    }

    /// Restores the saved session once per process.
    ///
    /// With both stored tokens present the profile is fetched; a 401 gets
    /// exactly one refresh-then-refetch. Any other outcome that leaves no
    /// user clears the session. The session is marked initialized whatever
    /// happens.
    pub async fn initialize(&self) {
        let _guard = self.init_lock.lock().await;
        if self.session.is_initialized() {
            return;
        }

        match self.session.stored_credentials().await {
            Ok(Some(credentials)) => {
                self.session.restore_tokens(credentials);
                self.restore_profile().await;
            }
            Ok(None) => tracing::debug!("No stored session to restore"),
            Err(e) => {
                tracing::warn!("Failed to read stored credentials: {}", e);
                self.session.clear().await;
            }
        }

        self.session.mark_initialized();
    }

    async fn restore_profile(&self) {
        let first = self.auth.profile_with_policy(RetryPolicy::Never).await;

        let outcome = match first {
            Err(e) if e.is_authentication_required() => {
                tracing::debug!("Stored access token rejected, refreshing");
                match self.gateway.refresh_access_token().await {
                    Ok(_) => self.auth.profile_with_policy(RetryPolicy::Never).await,
                    Err(refresh_err) => Err(refresh_err),
                }
            }
            other => other,
        };

        match outcome {
            Ok(user) => {
                tracing::info!("Restored session for {}", user.username);
                self.session.set_user(user);
            }
            Err(e) => {
                tracing::info!("Could not restore session: {}", e);
                self.session.clear().await;
            }
        }
    }

    pub async fn login(&self, credentials: LoginRequest) -> Result<UserProfile> {
        let response = self.auth.login(&credentials).await.inspect_err(|e| {
            tracing::warn!("Login failed: {}", e);
        })?;

        self.session
            .adopt(
                response.user.clone(),
                StoredCredentials::new(response.access, response.refresh),
            )
            .await;
        tracing::info!("Signed in as {}", response.user.username);
        Ok(response.user)
    }

    pub async fn register(&self, data: RegisterRequest) -> Result<UserProfile> {
        let response = self.auth.register(&data).await.inspect_err(|e| {
            tracing::warn!("Registration failed: {}", e);
        })?;

        self.session
            .adopt(
                response.user.clone(),
                StoredCredentials::new(response.access, response.refresh),
            )
            .await;
        tracing::info!("Registered and signed in as {}", response.user.username);
        Ok(response.user)
    }

    /// Replaces the access token using the stored refresh token.
    pub async fn refresh(&self) -> Result<()> {
        self.gateway.refresh_access_token().await.map(|_| ())
    }

    /// Invalidates the refresh token remotely when possible, then always
    /// clears local state. Remote failures are logged, never returned.
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.session.refresh_token() {
            if let Err(e) = self.auth.logout(&refresh_token).await {
                tracing::warn!("Logout request failed: {}", e);
            }
        }

        self.session.clear().await;
        tracing::info!("Signed out");
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile> {
        let user = self.auth.update_profile(&update).await?;
        self.session.set_user(user.clone());
        Ok(user)
    }

    pub async fn update_profile_partial(&self, update: ProfileUpdate) -> Result<UserProfile> {
        let user = self.auth.update_profile_partial(&update).await?;
        self.session.set_user(user.clone());
        Ok(user)
    }

    pub async fn change_password(&self, request: ChangePasswordRequest) -> Result<()> {
        self.auth.change_password(&request).await
    }

    /// Re-reads the profile; `Ok(None)` when nobody is signed in.
    pub async fn refresh_user_profile(&self) -> Result<Option<UserProfile>> {
        if !self.session.is_authenticated() {
            return Ok(None);
        }
        let user = self.auth.profile().await?;
        self.session.set_user(user.clone());
        Ok(Some(user))
    }

    // ============================================================================
    // Permission predicates
    // ============================================================================

    pub fn can_edit_post(&self, post: &Post) -> bool {
        user::can_edit_post(self.session.user().as_ref(), post)
    }

    pub fn can_edit_comment(&self, comment: &Comment) -> bool {
        user::can_edit_comment(self.session.user().as_ref(), comment)
    }

    pub fn can_moderate(&self) -> bool {
        user::can_moderate(self.session.user().as_ref())
    }
}
