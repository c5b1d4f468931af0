//! Payment ledger
//!
//! Two mutations exist and exactly one applies per request:
//!
//! - **renewal**: append a payment and push the due date one calendar month
//! - **ledger-only**: append a payment, due date untouched
//!
//! The pure rules here are what the collaborator applies; [`PaymentLedger`]
//! drives them through a [`MemberGateway`] and only hands back a snapshot
//! once the collaborator has confirmed it.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Months, NaiveDate, Utc};
use shared::{
    AppError, ErrorCode, GatewayError, Member, MemberGateway, MemberId, Payment, PaymentAmount,
};
use thiserror::Error;

use crate::in_flight::InFlight;

/// One calendar month later, clamped to the last day of the target month
///
/// `2024-01-31 → 2024-02-29`, `2023-01-31 → 2023-02-28`.
pub fn advance_one_month(date: NaiveDate) -> NaiveDate {
    date.checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX)
}

/// Append a payment and advance the due date
pub fn apply_renewal(member: &mut Member, amount: PaymentAmount, at: DateTime<Utc>) {
    member.payment_history.push(Payment::new(amount, at));
    member.payment_due_date = advance_one_month(member.payment_due_date);
}

/// Append a payment, leaving the due date alone
pub fn apply_ledger_payment(member: &mut Member, amount: PaymentAmount, at: DateTime<Utc>) {
    member.payment_history.push(Payment::new(amount, at));
}

/// Due dates shown before a renewal is confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalPreview {
    pub current_due: NaiveDate,
    pub next_due: NaiveDate,
}

pub fn renewal_preview(member: &Member) -> RenewalPreview {
    RenewalPreview {
        current_due: member.payment_due_date,
        next_due: advance_one_month(member.payment_due_date),
    }
}

/// Which of the two payment mutations a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentKind {
    Renewal,
    LedgerOnly,
}

impl fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentKind::Renewal => write!(f, "renewal"),
            PaymentKind::LedgerOnly => write!(f, "ledger-only"),
        }
    }
}

/// Ledger failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("member {0} not found")]
    MemberNotFound(MemberId),

    #[error("a payment for member {0} is already being recorded")]
    PaymentInProgress(MemberId),

    #[error("payment rejected: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<GatewayError> for LedgerError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(id) => LedgerError::MemberNotFound(id),
            GatewayError::InvalidAmount(msg) => LedgerError::InvalidAmount(msg),
            GatewayError::Rejected(msg) => LedgerError::Rejected(msg),
            GatewayError::Transport(msg) => LedgerError::Transport(msg),
            err @ GatewayError::AlreadyExists(_) => LedgerError::Rejected(err.to_string()),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidAmount(msg) => AppError::invalid_amount(msg),
            LedgerError::MemberNotFound(id) => AppError::member_not_found(id.as_str()),
            LedgerError::PaymentInProgress(id) => AppError::with_message(
                ErrorCode::PaymentInProgress,
                format!("A payment for member {} is already being recorded", id),
            ),
            LedgerError::Rejected(msg) => AppError::with_message(ErrorCode::PaymentRejected, msg),
            LedgerError::Transport(msg) => AppError::network(msg),
        }
    }
}

/// Payment service over the record gateway
#[derive(Clone)]
pub struct PaymentLedger {
    gateway: Arc<dyn MemberGateway>,
    in_flight: InFlight,
}

impl PaymentLedger {
    pub fn new(gateway: Arc<dyn MemberGateway>) -> Self {
        Self::with_guard(gateway, InFlight::new())
    }

    /// Share the in-flight set with other mutating services
    pub fn with_guard(gateway: Arc<dyn MemberGateway>, in_flight: InFlight) -> Self {
        Self { gateway, in_flight }
    }

    /// Record a payment and advance the due date one month
    ///
    /// Not idempotent: two confirmed renewals advance the due date twice.
    pub async fn renew(&self, id: &MemberId, amount_input: &str) -> Result<Member, LedgerError> {
        self.submit(PaymentKind::Renewal, id, amount_input).await
    }

    /// Record a payment without touching the due date
    pub async fn record_ledger_payment(
        &self,
        id: &MemberId,
        amount_input: &str,
    ) -> Result<Member, LedgerError> {
        self.submit(PaymentKind::LedgerOnly, id, amount_input).await
    }

    pub async fn submit(
        &self,
        kind: PaymentKind,
        id: &MemberId,
        amount_input: &str,
    ) -> Result<Member, LedgerError> {
        let amount = PaymentAmount::parse(amount_input)
            .map_err(|e| LedgerError::InvalidAmount(e.0))?;

        let Some(_guard) = self.in_flight.try_acquire(id) else {
            tracing::warn!(dni = %id, %kind, "Duplicate payment submission refused");
            return Err(LedgerError::PaymentInProgress(id.clone()));
        };

        let result = match kind {
            PaymentKind::Renewal => self.gateway.renew_payment(id, amount).await,
            PaymentKind::LedgerOnly => self.gateway.ledger_payment(id, amount).await,
        };

        match result {
            Ok(member) => {
                tracing::info!(
                    dni = %id,
                    %kind,
                    amount = %amount,
                    due = %member.payment_due_date,
                    "Payment recorded"
                );
                Ok(member)
            }
            Err(e) => {
                tracing::warn!(dni = %id, %kind, error = %e, "Payment failed");
                Err(e.into())
            }
        }
    }
}
