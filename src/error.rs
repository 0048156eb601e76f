//! Error taxonomy for the relay.
//!
//! Client calls return [`RelayError`] so the relay can decide per failure
//! whether the user gets a fallback reply or the request is rejected.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Upstream service an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Completion,
    Translation,
    Reply,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Completion => "completion",
            Self::Translation => "translation",
            Self::Reply => "reply",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing X-Line-Signature header")]
    MissingSignature,

    #[error("Signature does not match request body")]
    InvalidSignature,

    #[error("Malformed webhook body: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} API returned {status}: {body}")]
    UpstreamStatus {
        service: Service,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{service} API response has no '{field}'")]
    MissingField {
        service: Service,
        field: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, RelayError>;

impl RelayError {
    /// Status code returned to the webhook caller.
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingSignature | Self::InvalidSignature | Self::MalformedEvent(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Http(_) | Self::UpstreamStatus { .. } | Self::MissingField { .. } => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_client_error() {
            tracing::warn!(error = %self, "Rejected webhook request");
        } else {
            tracing::error!(error = %self, "Webhook request failed");
        }
        // No error detail leaks to the caller.
        let body = status.canonical_reason().unwrap_or("Error");
        (status, body).into_response()
    }
}
