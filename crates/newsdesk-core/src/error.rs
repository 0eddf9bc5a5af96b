//! Error types for the newsdesk client.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A shared error type for the entire newsdesk client.
///
/// Variants mirror how the remote API fails (HTTP status classes) plus the
/// local failure modes of the client itself (storage, configuration).
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum NewsdeskError {
    /// The request needs a valid session and none could be obtained.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// A token refresh was requested without a refresh token.
    #[error("Refresh token not available")]
    NoRefreshToken,

    /// 403
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// 429
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// 400 with field-level messages when the API provided them.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    /// 5xx
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-success status.
    #[error("HTTP error ({status}): {message}")]
    Http { status: u16, message: String },

    /// The server could not be reached (connect failure, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The request could not be built or sent.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// IO error (credential file, config file)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A caller passed an argument the client refuses to send.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification used for presentation and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AuthenticationRequired,
    Forbidden,
    NotFound,
    RateLimited,
    Validation,
    Server,
    Network,
    MalformedRequest,
    Unexpected,
}

impl NewsdeskError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builds the error for a non-success HTTP status.
    ///
    /// `body` is the raw response payload; DRF-style `{"detail": "..."}`,
    /// `{"error": "..."}` and `{"field": ["..."]}` shapes are understood.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let parsed: Option<serde_json::Value> = serde_json::from_slice(body).ok();
        let detail = parsed.as_ref().and_then(detail_message);

        match status {
            400 => {
                let fields = parsed.as_ref().map(field_errors).unwrap_or_default();
                let message = detail
                    .or_else(|| {
                        fields
                            .values()
                            .next()
                            .and_then(|messages| messages.first().cloned())
                    })
                    .unwrap_or_else(|| "Invalid request data".to_string());
                Self::Validation { message, fields }
            }
            401 => Self::AuthenticationRequired,
            403 => Self::Forbidden(detail.unwrap_or_else(|| "Permission denied".to_string())),
            404 => Self::NotFound(detail.unwrap_or_else(|| "Resource not found".to_string())),
            429 => Self::RateLimited(detail.unwrap_or_else(|| "Too many requests".to_string())),
            500..=599 => Self::Server {
                status,
                message: detail.unwrap_or_else(|| "Internal server error".to_string()),
            },
            _ => Self::Http {
                status,
                message: detail.unwrap_or_else(|| format!("Unexpected status {}", status)),
            },
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_authentication_required(&self) -> bool {
        matches!(self, Self::AuthenticationRequired)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// HTTP status this error was built from, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationRequired => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::RateLimited(_) => Some(429),
            Self::Validation { .. } => Some(400),
            Self::Server { status, .. } | Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthenticationRequired | Self::NoRefreshToken => ErrorKind::AuthenticationRequired,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::RateLimited(_) => ErrorKind::RateLimited,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Server { .. } => ErrorKind::Server,
            Self::Network(_) => ErrorKind::Network,
            Self::MalformedRequest(_) => ErrorKind::MalformedRequest,
            _ => ErrorKind::Unexpected,
        }
    }

    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthenticationRequired | Self::NoRefreshToken => {
                "Authentication required. Please sign in.".to_string()
            }
            Self::Validation { message, .. } => message.clone(),
            Self::Forbidden(_) => "You do not have permission to perform this action.".to_string(),
            Self::NotFound(_) => "The requested resource was not found.".to_string(),
            Self::RateLimited(_) => "Too many requests. Please try again later.".to_string(),
            Self::Server { .. } => "Internal server error. Please try again later.".to_string(),
            Self::Network(_) => "Unable to connect to the server.".to_string(),
            Self::MalformedRequest(_) => "An error occurred while sending the request.".to_string(),
            _ => "An unexpected error occurred.".to_string(),
        }
    }
}

fn detail_message(value: &serde_json::Value) -> Option<String> {
    ["detail", "error", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

fn field_errors(value: &serde_json::Value) -> BTreeMap<String, Vec<String>> {
    let Some(object) = value.as_object() else {
        return BTreeMap::new();
    };

    object
        .iter()
        .filter_map(|(field, messages)| {
            let messages: Vec<String> = match messages {
                serde_json::Value::Array(items) => items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
                serde_json::Value::String(message) if field != "detail" => vec![message.clone()],
                _ => Vec::new(),
            };
            (!messages.is_empty()).then(|| (field.clone(), messages))
        })
        .collect()
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for NewsdeskError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for NewsdeskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for NewsdeskError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, NewsdeskError>`.
pub type Result<T> = std::result::Result<T, NewsdeskError>;
