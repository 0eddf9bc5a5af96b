//! Composition root for one client instance.
//!
//! [`AppContext`] builds the gateway and every store over a single shared
//! session, so two contexts never observe each other's state.

use std::sync::Arc;

use newsdesk_core::config::ClientConfig;
use newsdesk_core::credentials::CredentialStore;
use newsdesk_core::Result;
use newsdesk_infrastructure::FileCredentialStore;
use newsdesk_interaction::api::UploadApi;
use newsdesk_interaction::notification::{self, NotificationReceiver};
use newsdesk_interaction::{ApiGateway, ReqwestTransport, SessionHandle, Transport};

use crate::comments_store::CommentsStore;
use crate::posts_store::PostsStore;
use crate::router::Router;
use crate::session_store::SessionStore;
use crate::subscription_store::SubscriptionStore;

/// Owns the gateway and all stores.
///
/// # Thread Safety
///
/// Every member is `Arc`-shared and uses interior mutability, so the context
/// can be cloned into tasks freely.
#[derive(Clone)]
pub struct AppContext {
    config: Arc<ClientConfig>,
    gateway: Arc<ApiGateway>,
    session: Arc<SessionStore>,
    posts: Arc<PostsStore>,
    comments: Arc<CommentsStore>,
    subscription: Arc<SubscriptionStore>,
    router: Arc<Router>,
}

impl AppContext {
    /// Wires stores over an arbitrary transport and credential backend.
    ///
    /// # Arguments
    ///
    /// * `config` - Client settings (page size, app origin for redirects)
    /// * `transport` - Where requests are sent
    /// * `credentials` - Durable token storage
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self::build(config, transport, credentials, None)
    }

    /// Same as [`AppContext::new`], also returning the receiver for
    /// gateway notifications.
    pub fn with_notifications(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
    ) -> (Self, NotificationReceiver) {
        let (tx, rx) = notification::channel();
        (Self::build(config, transport, credentials, Some(tx)), rx)
    }

    /// Production wiring: reqwest transport and the credentials file.
    pub fn from_config(config: ClientConfig) -> Result<(Self, NotificationReceiver)> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        let credentials = match &config.credentials_path {
            Some(path) => FileCredentialStore::with_path(path),
            None => FileCredentialStore::new()?,
        };
        tracing::debug!(
            "[AppContext] API {}, credentials at {}",
            config.api_base_url,
            credentials.path().display()
        );

        Ok(Self::with_notifications(
            config,
            transport,
            Arc::new(credentials),
        ))
    }

    fn build(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
        notifier: Option<notification::NotificationSender>,
    ) -> Self {
        let session_handle = SessionHandle::new(credentials);
        let mut gateway = ApiGateway::new(transport, session_handle);
        if let Some(notifier) = notifier {
            gateway = gateway.with_notifier(notifier);
        }
        let gateway = Arc::new(gateway);
        let config = Arc::new(config);

        let session = Arc::new(SessionStore::new(gateway.clone()));
        let posts = Arc::new(PostsStore::new(gateway.clone(), config.page_size));
        let comments = Arc::new(CommentsStore::new(gateway.clone()));
        let subscription = Arc::new(SubscriptionStore::new(gateway.clone(), config.clone()));
        let router = Arc::new(Router::new(session.clone()));

        Self {
            config,
            gateway,
            session,
            posts,
            comments,
            subscription,
            router,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn gateway(&self) -> &Arc<ApiGateway> {
        &self.gateway
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn posts(&self) -> &PostsStore {
        &self.posts
    }

    pub fn comments(&self) -> &CommentsStore {
        &self.comments
    }

    pub fn subscription(&self) -> &SubscriptionStore {
        &self.subscription
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Image upload endpoint, stateless.
    pub fn uploads(&self) -> UploadApi {
        UploadApi::new(self.gateway.clone())
    }
}
