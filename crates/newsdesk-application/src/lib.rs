//! Application layer: observable state containers over the API.
//!
//! Every store is owned by an [`AppContext`]; nothing here is global.

pub mod comments_store;
pub mod context;
pub mod posts_store;
pub mod router;
pub mod session_store;
pub mod subscription_store;

pub use comments_store::CommentsStore;
pub use context::AppContext;
pub use posts_store::{PostsState, PostsStore};
pub use router::{Navigation, RouteName, Router};
pub use session_store::SessionStore;
pub use subscription_store::{SubscriptionSnapshot, SubscriptionStore};
