//! Subscription, pinned-post and payment models.
//!
//! - `model`: plans, the user's subscription and pinned post, status envelope
//! - `payment`: checkout sessions and payment records

mod model;
mod payment;

pub use model::{
    CanPinResponse, PinPostRequest, PinnedPost, PinnedPostInfo, PlanId, Subscription,
    SubscriptionPlan, SubscriptionState, SubscriptionStatus,
};
pub use payment::{CheckoutRequest, CheckoutSession, Payment, PaymentId, PaymentStatus};
