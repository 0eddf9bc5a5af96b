//! Typed endpoint groups, one per API area.
//!
//! Every group holds the shared [`ApiGateway`] and only knows paths and
//! payload shapes; state lives in the application layer.

mod auth;
mod categories;
mod comments;
mod payment;
mod posts;
mod subscription;
mod upload;

pub use auth::AuthApi;
pub use categories::CategoriesApi;
pub use comments::CommentsApi;
pub use payment::PaymentApi;
pub use posts::PostsApi;
pub use subscription::SubscriptionApi;
pub use upload::{UploadApi, UploadedImage};

/// Query parameters as sent on the wire.
pub type QueryPairs = Vec<(String, String)>;
