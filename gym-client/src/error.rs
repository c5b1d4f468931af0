//! Client error types

use shared::GatewayError;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error (400 / 422)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource already exists (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Server-side failure
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Map onto the gateway taxonomy
    ///
    /// `not_found` supplies the member the request was about, since the
    /// server's 404 body only carries a message.
    pub fn into_gateway(self, not_found: Option<&shared::MemberId>) -> GatewayError {
        match self {
            ClientError::NotFound(msg) => match not_found {
                Some(id) => GatewayError::NotFound(id.clone()),
                None => GatewayError::Rejected(msg),
            },
            ClientError::Validation(msg) | ClientError::Conflict(msg) => {
                GatewayError::Rejected(msg)
            }
            other => GatewayError::Transport(other.to_string()),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
