//! Domain layer of the newsdesk client: models, errors, configuration and
//! the storage traits implemented by `newsdesk-infrastructure`.

pub mod comment;
pub mod config;
pub mod credentials;
pub mod error;
pub mod pagination;
pub mod post;
pub mod session;
pub mod subscription;
pub mod user;

// Re-export common error type
pub use error::{NewsdeskError, Result};
