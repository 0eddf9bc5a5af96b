//! User-facing notifications emitted by the gateway.
//!
//! The client never renders them; a front end drains the channel.

use newsdesk_core::NewsdeskError;
use newsdesk_core::error::ErrorKind;
use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub kind: ErrorKind,
    pub message: String,
}

impl Notification {
    pub fn from_error(err: &NewsdeskError) -> Self {
        Self {
            level: NotificationLevel::Error,
            kind: err.kind(),
            message: err.user_message(),
        }
    }

    /// The stored session could not be renewed.
    pub fn session_expired() -> Self {
        Self {
            level: NotificationLevel::Warning,
            kind: ErrorKind::AuthenticationRequired,
            message: "Session expired. Please sign in again.".to_string(),
        }
    }
}

pub type NotificationSender = mpsc::UnboundedSender<Notification>;
pub type NotificationReceiver = mpsc::UnboundedReceiver<Notification>;

/// Creates the channel the gateway publishes into.
pub fn channel() -> (NotificationSender, NotificationReceiver) {
    mpsc::unbounded_channel()
}
