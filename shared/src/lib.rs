//! Shared types for the gym front desk
//!
//! Common types used across the client and the front-desk engine:
//! member and payment models, error codes, and the record access
//! gateway trait.

pub mod date_format;
pub mod error;
pub mod gateway;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use gateway::{GatewayError, GatewayResult, MemberGateway};
pub use models::{
    DailyAttendee, InvalidAmount, Member, MemberCreate, MemberId, MemberUpdate, MembershipStatus,
    Payment, PaymentAmount, PlanType,
};
