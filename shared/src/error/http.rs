//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound | Self::MemberNotFound => StatusCode::NOT_FOUND,

            Self::AlreadyExists | Self::MemberAlreadyExists | Self::PaymentInProgress => {
                StatusCode::CONFLICT
            }

            Self::NetworkError => StatusCode::SERVICE_UNAVAILABLE,

            Self::Unknown | Self::InternalError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
