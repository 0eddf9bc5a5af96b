use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::post::PostId;

pub type PlanId = i64;

/// A purchasable plan. `price` is the decimal string the API renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: PlanId,
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub duration_days: u32,
    #[serde(default)]
    pub features: serde_json::Value,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubscriptionState {
    Active,
    Expired,
    Cancelled,
    #[default]
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub plan: PlanId,
    #[serde(default)]
    pub plan_info: Option<SubscriptionPlan>,
    #[serde(default)]
    pub status: SubscriptionState,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub auto_renew: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub days_remaining: i64,
}

/// Post summary embedded in a pinned-post record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinnedPostInfo {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub views_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinnedPost {
    pub id: i64,
    pub post: PostId,
    #[serde(default)]
    pub post_info: Option<PinnedPostInfo>,
    pub pinned_at: DateTime<Utc>,
}

/// Response of `/subscribe/status/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    #[serde(default)]
    pub has_subscription: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub subscription: Option<Subscription>,
    #[serde(default)]
    pub pinned_post: Option<PinnedPost>,
    #[serde(default)]
    pub can_pin_posts: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PinPostRequest {
    pub post_id: PostId,
}

/// Response of `/subscribe/can-pin/{post_id}/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanPinResponse {
    pub post_id: PostId,
    pub can_pin: bool,
    #[serde(default)]
    pub checks: serde_json::Value,
    #[serde(default)]
    pub message: String,
}
