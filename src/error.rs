//! Error types for operations against the backend
//!
//! Every asynchronous failure is caught at an operation boundary (login,
//! startup, refresh-retry) and converted to a state transition or a return
//! value; nothing escapes to callers as an unhandled panic.

use thiserror::Error;

/// Default message when the backend gives nothing usable
pub const DEFAULT_LOGIN_ERROR: &str = "Unable to sign in. Please try again.";

/// Failure surfaced by the authenticated HTTP client
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (DNS, TLS, connection reset)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend responded with a non-success status
    #[error("request failed with status {status}")]
    Status {
        status: u16,
        /// Parsed response payload, when the backend sent one
        body: Option<serde_json::Value>,
    },

    /// Response body did not match the expected shape
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Token storage failed underneath an HTTP operation
    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}

impl ApiError {
    /// Whether this is an authentication failure eligible for refresh-retry
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }

    /// HTTP status, when the backend responded at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable message suitable for the login form
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { body, .. } => flatten_error_body(body.as_ref()),
            _ => DEFAULT_LOGIN_ERROR.to_string(),
        }
    }
}

/// Flatten a backend error payload into a single human-readable line
///
/// Field-keyed objects become `field: message` pairs joined by commas (array
/// values are joined the same way), string payloads pass through unchanged,
/// and anything else falls back to [`DEFAULT_LOGIN_ERROR`].
pub fn flatten_error_body(body: Option<&serde_json::Value>) -> String {
    match body {
        Some(serde_json::Value::String(message)) => message.clone(),
        Some(serde_json::Value::Object(fields)) if !fields.is_empty() => fields
            .iter()
            .map(|(field, value)| format!("{}: {}", field, flatten_field_value(value)))
            .collect::<Vec<_>>()
            .join(", "),
        _ => DEFAULT_LOGIN_ERROR.to_string(),
    }
}

fn flatten_field_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(message) => message.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(flatten_field_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
