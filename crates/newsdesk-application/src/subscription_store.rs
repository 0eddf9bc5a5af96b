//! Subscription, pinned post and payments.

use std::sync::Arc;

use newsdesk_core::config::ClientConfig;
use newsdesk_core::post::PostId;
use newsdesk_core::subscription::{
    CanPinResponse, CheckoutRequest, CheckoutSession, Payment, PaymentId, PinnedPost,
    PinnedPostInfo, PlanId, Subscription, SubscriptionPlan, SubscriptionStatus,
};
use newsdesk_core::{NewsdeskError, Result};
use newsdesk_interaction::ApiGateway;
use newsdesk_interaction::api::{PaymentApi, SubscriptionApi};
use tokio::sync::RwLock;

pub const PAYMENT_SUCCESS_PATH: &str = "/subscription/success";
pub const PAYMENT_CANCEL_PATH: &str = "/subscription/cancel";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionSnapshot {
    pub subscription: Option<Subscription>,
    pub plans: Vec<SubscriptionPlan>,
    pub pinned_post: Option<PinnedPost>,
}

impl SubscriptionSnapshot {
    pub fn has_subscription(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|subscription| subscription.is_active)
    }

    /// Pinning is open to active subscribers.
    pub fn can_pin_posts(&self) -> bool {
        self.is_active()
    }

    pub fn plan_info(&self) -> Option<&SubscriptionPlan> {
        self.subscription
            .as_ref()
            .and_then(|subscription| subscription.plan_info.as_ref())
    }

    pub fn pinned_post_info(&self) -> Option<&PinnedPostInfo> {
        self.pinned_post
            .as_ref()
            .and_then(|pinned| pinned.post_info.as_ref())
    }

    /// Zero without a subscription.
    pub fn days_remaining(&self) -> i64 {
        self.subscription
            .as_ref()
            .map(|subscription| subscription.days_remaining)
            .unwrap_or(0)
    }
}

pub struct SubscriptionStore {
    subscription_api: SubscriptionApi,
    payment_api: PaymentApi,
    config: Arc<ClientConfig>,
    state: RwLock<SubscriptionSnapshot>,
}

impl SubscriptionStore {
    pub fn new(gateway: Arc<ApiGateway>, config: Arc<ClientConfig>) -> Self {
        Self {
            subscription_api: SubscriptionApi::new(gateway.clone()),
            payment_api: PaymentApi::new(gateway),
            config,
            state: RwLock::new(SubscriptionSnapshot::default()),
        }
    }

    pub async fn snapshot(&self) -> SubscriptionSnapshot {
        self.state.read().await.clone()
    }

    pub async fn subscription(&self) -> Option<Subscription> {
        self.state.read().await.subscription.clone()
    }

    pub async fn pinned_post(&self) -> Option<PinnedPost> {
        self.state.read().await.pinned_post.clone()
    }

    pub async fn plans(&self) -> Vec<SubscriptionPlan> {
        self.state.read().await.plans.clone()
    }

    pub async fn has_subscription(&self) -> bool {
        self.state.read().await.has_subscription()
    }

    pub async fn is_active(&self) -> bool {
        self.state.read().await.is_active()
    }

    pub async fn can_pin_posts(&self) -> bool {
        self.state.read().await.can_pin_posts()
    }

    pub async fn plan_info(&self) -> Option<SubscriptionPlan> {
        self.state.read().await.plan_info().cloned()
    }

    pub async fn pinned_post_info(&self) -> Option<PinnedPostInfo> {
        self.state.read().await.pinned_post_info().cloned()
    }

    pub async fn days_remaining(&self) -> i64 {
        self.state.read().await.days_remaining()
    }

    // ============================================================================
    // Subscription
    // ============================================================================

    pub async fn fetch_plans(&self) -> Result<Vec<SubscriptionPlan>> {
        match self.subscription_api.plans().await {
            Ok(plans) => {
                tracing::debug!("[SubscriptionStore] Loaded {} plans", plans.len());
                self.state.write().await.plans = plans.clone();
                Ok(plans)
            }
            Err(e) => {
                tracing::error!("[SubscriptionStore] Failed to load plans: {}", e);
                self.state.write().await.plans.clear();
                Err(e)
            }
        }
    }

    /// Mirrors the remote subscription and pin.
    ///
    /// A 404 means "no subscription" and resolves to an empty status.
    pub async fn fetch_subscription_status(&self) -> Result<SubscriptionStatus> {
        match self.subscription_api.status().await {
            Ok(status) => {
                let mut state = self.state.write().await;
                state.subscription = status.subscription.clone();
                state.pinned_post = status.pinned_post.clone();
                Ok(status)
            }
            Err(e) => {
                {
                    let mut state = self.state.write().await;
                    state.subscription = None;
                    state.pinned_post = None;
                }
                if e.is_not_found() {
                    tracing::debug!("[SubscriptionStore] No subscription on record");
                    return Ok(SubscriptionStatus::default());
                }
                tracing::error!("[SubscriptionStore] Failed to load subscription status: {}", e);
                Err(e)
            }
        }
    }

    pub async fn fetch_my_subscription(&self) -> Result<Subscription> {
        match self.subscription_api.my_subscription().await {
            Ok(subscription) => {
                self.state.write().await.subscription = Some(subscription.clone());
                Ok(subscription)
            }
            Err(e) => {
                tracing::error!("[SubscriptionStore] Failed to load subscription: {}", e);
                self.state.write().await.subscription = None;
                Err(e)
            }
        }
    }

    /// Cancels remotely; the local subscription and pin go with it.
    pub async fn cancel_subscription(&self) -> Result<()> {
        self.subscription_api.cancel().await.inspect_err(|e| {
            tracing::error!("[SubscriptionStore] Failed to cancel subscription: {}", e);
        })?;

        let mut state = self.state.write().await;
        state.subscription = None;
        state.pinned_post = None;
        tracing::info!("[SubscriptionStore] Subscription cancelled");
        Ok(())
    }

    // ============================================================================
    // Pinned post
    // ============================================================================

    /// Pins `post_id`. Eligibility is left to the server.
    pub async fn pin_post(&self, post_id: PostId) -> Result<PinnedPost> {
        if post_id <= 0 {
            return Err(NewsdeskError::invalid_argument("post id is required"));
        }

        let pinned = self.subscription_api.pin_post(post_id).await.inspect_err(|e| {
            tracing::error!("[SubscriptionStore] Failed to pin post {}: {}", post_id, e);
        })?;
        self.state.write().await.pinned_post = Some(pinned.clone());
        tracing::info!("[SubscriptionStore] Pinned post {}", post_id);
        Ok(pinned)
    }

    pub async fn unpin_post(&self) -> Result<()> {
        self.subscription_api.unpin_post().await.inspect_err(|e| {
            tracing::error!("[SubscriptionStore] Failed to unpin post: {}", e);
        })?;
        self.state.write().await.pinned_post = None;
        Ok(())
    }

    /// Re-reads the user's own pin.
    pub async fn fetch_pinned_post(&self) -> Result<Option<PinnedPost>> {
        match self.subscription_api.pinned_post().await {
            Ok(pinned) => {
                self.state.write().await.pinned_post = Some(pinned.clone());
                Ok(Some(pinned))
            }
            Err(e) if e.is_not_found() => {
                self.state.write().await.pinned_post = None;
                Ok(None)
            }
            Err(e) => {
                tracing::error!("[SubscriptionStore] Failed to load pinned post: {}", e);
                self.state.write().await.pinned_post = None;
                Err(e)
            }
        }
    }

    /// Pinned posts of every subscriber; not cached.
    pub async fn fetch_pinned_posts(&self) -> Result<Vec<PinnedPost>> {
        self.subscription_api.pinned_posts().await
    }

    pub async fn can_pin_post(&self, post_id: PostId) -> Result<CanPinResponse> {
        self.subscription_api.can_pin(post_id).await
    }

    // ============================================================================
    // Payments
    // ============================================================================

    /// Starts a checkout for `plan_id`; the caller sends the user to
    /// [`CheckoutSession::checkout_url`].
    pub async fn create_checkout_session(&self, plan_id: PlanId) -> Result<CheckoutSession> {
        if plan_id <= 0 {
            return Err(NewsdeskError::invalid_argument("plan id is required"));
        }

        let request = CheckoutRequest {
            subscription_plan_id: plan_id,
            success_url: self.config.app_url(PAYMENT_SUCCESS_PATH),
            cancel_url: self.config.app_url(PAYMENT_CANCEL_PATH),
        };

        let session = self
            .payment_api
            .create_checkout_session(&request)
            .await
            .inspect_err(|e| {
                tracing::error!("[SubscriptionStore] Failed to create checkout session: {}", e);
            })?;
        tracing::info!(
            "[SubscriptionStore] Checkout session {} for plan {}",
            session.session_id.as_deref().unwrap_or("-"),
            plan_id
        );
        Ok(session)
    }

    pub async fn payment_status(&self, id: PaymentId) -> Result<Payment> {
        self.payment_api.status(id).await
    }

    pub async fn payment_history(&self) -> Result<Vec<Payment>> {
        self.payment_api.history().await
    }

    pub async fn cancel_payment(&self, id: PaymentId) -> Result<Payment> {
        self.payment_api.cancel(id).await.inspect_err(|e| {
            tracing::error!("[SubscriptionStore] Failed to cancel payment {}: {}", id, e);
        })
    }

    pub async fn reset(&self) {
        *self.state.write().await = SubscriptionSnapshot::default();
    }
}
