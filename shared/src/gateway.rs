//! Record access gateway
//!
//! The single seam between the front-desk engine and whatever stores the
//! member records. The engine never assumes a transport; the HTTP client
//! and the in-memory store both implement [`MemberGateway`].

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::error::{AppError, ErrorCode};
use crate::models::{DailyAttendee, Member, MemberCreate, MemberId, MemberUpdate, PaymentAmount};

/// Gateway failure
///
/// Domain outcomes (`NotFound`, `InvalidAmount`, `Rejected`) are kept apart
/// from `Transport`, which covers anything that kept the request from
/// getting an answer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// No member with this identifier
    #[error("member {0} not found")]
    NotFound(MemberId),

    /// Collaborator refused the payment amount
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A member with this identifier is already registered
    #[error("member {0} already exists")]
    AlreadyExists(MemberId),

    /// Collaborator refused the request (bad field, ...)
    #[error("rejected: {0}")]
    Rejected(String),

    /// Network or server failure
    #[error("transport error: {0}")]
    Transport(String),
}

impl GatewayError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(id) => AppError::member_not_found(id.as_str()),
            GatewayError::AlreadyExists(id) => AppError::member_already_exists(id.as_str()),
            GatewayError::InvalidAmount(msg) => AppError::invalid_amount(msg),
            GatewayError::Rejected(msg) => AppError::with_message(ErrorCode::InvalidRequest, msg),
            GatewayError::Transport(msg) => AppError::network(msg),
        }
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Narrow async interface to the member store
#[async_trait]
pub trait MemberGateway: Send + Sync {
    /// Fetch one member by national ID
    async fn find_by_id(&self, id: &MemberId) -> GatewayResult<Member>;

    /// All members, in the collaborator's order
    async fn list(&self) -> GatewayResult<Vec<Member>>;

    /// Register a new member
    async fn create(&self, member: MemberCreate) -> GatewayResult<Member>;

    /// Patch an existing member
    async fn update(&self, id: &MemberId, patch: MemberUpdate) -> GatewayResult<Member>;

    /// Append a payment and advance the due date by one month
    async fn renew_payment(&self, id: &MemberId, amount: PaymentAmount) -> GatewayResult<Member>;

    /// Append a payment, due date untouched
    async fn ledger_payment(&self, id: &MemberId, amount: PaymentAmount) -> GatewayResult<Member>;

    /// Record a check-in at the collaborator's current time
    async fn record_attendance(&self, id: &MemberId) -> GatewayResult<()>;

    /// Members who checked in on a civil date, with that day's check-ins
    async fn attendance_by_date(&self, date: NaiveDate) -> GatewayResult<Vec<DailyAttendee>>;

    /// Hard removal
    async fn delete(&self, id: &MemberId) -> GatewayResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_to_app_error() {
        let id = MemberId::parse("12345678").unwrap();

        let err: AppError = GatewayError::NotFound(id.clone()).into();
        assert_eq!(err.code, ErrorCode::MemberNotFound);
        assert!(!err.is_inline());

        let err: AppError = GatewayError::AlreadyExists(id).into();
        assert_eq!(err.code, ErrorCode::MemberAlreadyExists);
        assert_eq!(err.code.http_status(), http::StatusCode::CONFLICT);
        assert_eq!(err.field(), None);

        let err: AppError = GatewayError::InvalidAmount("negative".into()).into();
        assert_eq!(err.code, ErrorCode::InvalidAmount);
        assert!(err.is_inline());

        let err: AppError = GatewayError::transport("connection reset").into();
        assert_eq!(err.code, ErrorCode::NetworkError);
        assert!(err.is_transport());
    }
}
