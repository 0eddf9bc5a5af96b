//! User domain module.
//!
//! - `model`: user profile and the request payloads of the auth endpoints
//! - `permissions`: ownership / staff predicates used to gate edit actions

mod model;
mod permissions;

pub use model::{
    AuthResponse, AuthorInfo, ChangePasswordRequest, LoginRequest, ProfileUpdate, RefreshResponse,
    RegisterRequest, UserId, UserProfile,
};
pub use permissions::{can_edit_comment, can_edit_post, can_moderate};

#[cfg(test)]
pub(crate) use model::sample_user;
