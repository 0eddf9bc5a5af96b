use std::sync::Arc;

use newsdesk_core::Result;
use newsdesk_core::pagination::ListResponse;
use newsdesk_core::post::PostId;
use newsdesk_core::subscription::{
    CanPinResponse, PinPostRequest, PinnedPost, Subscription, SubscriptionPlan, SubscriptionStatus,
};
use serde::de::IgnoredAny;

use crate::gateway::ApiGateway;

const PLANS: &str = "/api/v1/subscribe/plans/";
const STATUS: &str = "/api/v1/subscribe/status/";
const MY_SUBSCRIPTION: &str = "/api/v1/subscribe/my-subscription/";
const CANCEL: &str = "/api/v1/subscribe/cancel/";
const PINNED_POST: &str = "/api/v1/subscribe/pinned-post/";
const PIN_POST: &str = "/api/v1/subscribe/pin-post/";
const UNPIN_POST: &str = "/api/v1/subscribe/unpin-post/";
const PINNED_POSTS: &str = "/api/v1/subscribe/pinned-posts/";

#[derive(Clone)]
pub struct SubscriptionApi {
    gateway: Arc<ApiGateway>,
}

impl SubscriptionApi {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    /// Plans, whether the API pages them or not.
    pub async fn plans(&self) -> Result<Vec<SubscriptionPlan>> {
        let list: ListResponse<SubscriptionPlan> = self.gateway.get_json(PLANS).await?;
        Ok(list.into_items())
    }

    pub async fn status(&self) -> Result<SubscriptionStatus> {
        self.gateway.get_json(STATUS).await
    }

    pub async fn my_subscription(&self) -> Result<Subscription> {
        self.gateway.get_json(MY_SUBSCRIPTION).await
    }

    pub async fn cancel(&self) -> Result<()> {
        let _: IgnoredAny = self.gateway.post_empty(CANCEL).await?;
        Ok(())
    }

    pub async fn pinned_post(&self) -> Result<PinnedPost> {
        self.gateway.get_json(PINNED_POST).await
    }

    pub async fn pin_post(&self, post_id: PostId) -> Result<PinnedPost> {
        self.gateway
            .post_json(PIN_POST, &PinPostRequest { post_id })
            .await
    }

    pub async fn unpin_post(&self) -> Result<()> {
        let _: IgnoredAny = self.gateway.post_empty(UNPIN_POST).await?;
        Ok(())
    }

    /// Every currently pinned post across users.
    pub async fn pinned_posts(&self) -> Result<Vec<PinnedPost>> {
        let list: ListResponse<PinnedPost> = self.gateway.get_json(PINNED_POSTS).await?;
        Ok(list.into_items())
    }

    pub async fn can_pin(&self, post_id: PostId) -> Result<CanPinResponse> {
        self.gateway
            .get_json(&format!("/api/v1/subscribe/can-pin/{}/", post_id))
            .await
    }
}
