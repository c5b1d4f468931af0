//! Payment Model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Method shown when a payment carries none
pub const DEFAULT_PAYMENT_METHOD: &str = "Efectivo";

/// One ledger entry
///
/// Entries are only ever appended; their position in
/// `Member::payment_history` is their chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub payment_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl Payment {
    pub fn new(amount: PaymentAmount, payment_date: DateTime<Utc>) -> Self {
        Self {
            amount: amount.value(),
            payment_date,
            method: None,
        }
    }

    /// Payment method, falling back to [`DEFAULT_PAYMENT_METHOD`]
    pub fn method_or_default(&self) -> &str {
        self.method.as_deref().unwrap_or(DEFAULT_PAYMENT_METHOD)
    }
}

/// Rejected payment amount
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid payment amount: {0}")]
pub struct InvalidAmount(pub String);

/// A finite, strictly positive payment amount
///
/// The only way into the ledger: both payment operations take this type,
/// so non-numeric or non-positive input is refused before any request is
/// built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaymentAmount(Decimal);

impl PaymentAmount {
    /// Parse raw form input (`"100"`, `" 99.50 "`)
    pub fn parse(raw: &str) -> Result<Self, InvalidAmount> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidAmount("amount is empty".to_string()));
        }
        let value = Decimal::from_str(trimmed)
            .map_err(|_| InvalidAmount(format!("'{}' is not a number", trimmed)))?;
        Self::try_from(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for PaymentAmount {
    type Error = InvalidAmount;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value <= Decimal::ZERO {
            return Err(InvalidAmount(format!(
                "amount must be greater than zero, got {}",
                value
            )));
        }
        Ok(Self(value))
    }
}

impl TryFrom<f64> for PaymentAmount {
    type Error = InvalidAmount;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(InvalidAmount(format!(
                "amount must be a finite number, got {}",
                value
            )));
        }
        let decimal = Decimal::from_f64(value)
            .ok_or_else(|| InvalidAmount(format!("amount {} is out of range", value)))?;
        Self::try_from(decimal)
    }
}

impl FromStr for PaymentAmount {
    type Err = InvalidAmount;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PaymentAmount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl fmt::Display for PaymentAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Body of both payment endpoints
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRequest {
    pub amount: PaymentAmount,
}
