//! Member Model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::payment::Payment;
use crate::error::AppError;

/// Number of digits in a national ID
pub const MEMBER_ID_LEN: usize = 8;

/// National ID (DNI), the member's unique and immutable key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberId(String);

impl MemberId {
    /// Accepts exactly [`MEMBER_ID_LEN`] ASCII digits, surrounding blanks ignored
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        if trimmed.len() != MEMBER_ID_LEN || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppError::with_message(
                crate::error::ErrorCode::MemberIdInvalid,
                format!("'{}' is not an 8-digit national ID", trimmed),
            )
            .with_detail("field", "dni"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MemberId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MemberId> for String {
    fn from(id: MemberId) -> Self {
        id.0
    }
}

impl FromStr for MemberId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Membership plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlanType {
    #[default]
    Full,
    #[serde(rename = "Semanal", alias = "Weekly")]
    Weekly,
}

impl PlanType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Full => "Full",
            Self::Weekly => "Semanal",
        }
    }
}

impl FromStr for PlanType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "semanal" | "weekly" => Ok(Self::Weekly),
            other => Err(AppError::invalid_format(
                "planType",
                format!("unknown plan '{}'", other),
            )),
        }
    }
}

/// Standing derived from the due date
///
/// Never stored: every read recomputes it with `due >= today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipStatus {
    /// Paid up (due date today or later)
    #[serde(rename = "Al día")]
    Current,
    /// Due date in the past
    #[serde(rename = "Vencido")]
    Overdue,
}

impl MembershipStatus {
    /// Inclusive boundary: a membership due today is still current
    pub fn resolve(due: NaiveDate, today: NaiveDate) -> Self {
        if due >= today {
            Self::Current
        } else {
            Self::Overdue
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Current => "Al día",
            Self::Overdue => "Vencido",
        }
    }

    /// Front-desk badge: whether the member may train
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Current)
    }
}

fn default_true() -> bool {
    true
}

/// Member entity
///
/// Any `status` the collaborator sends is ignored on purpose; use
/// [`Member::status`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(rename = "dni")]
    pub id: MemberId,
    pub name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub plan_type: PlanType,
    #[serde(with = "crate::date_format")]
    pub payment_due_date: NaiveDate,
    #[serde(default, with = "crate::date_format::option")]
    pub join_date: Option<NaiveDate>,
    #[serde(rename = "activo", default = "default_true")]
    pub active: bool,
    #[serde(rename = "medicamento", default)]
    pub medication: Option<String>,
    #[serde(rename = "patologias", default)]
    pub conditions: Option<String>,
    #[serde(rename = "image", default, skip_serializing_if = "Option::is_none")]
    pub portrait: Option<String>,
    #[serde(default)]
    pub payment_history: Vec<Payment>,
    #[serde(rename = "asistencias", default)]
    pub attendance_log: Vec<DateTime<Utc>>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.last_name)
    }

    /// Standing as of `today` (a civil date in the gym's timezone)
    pub fn status(&self, today: NaiveDate) -> MembershipStatus {
        MembershipStatus::resolve(self.payment_due_date, today)
    }

    pub fn last_payment(&self) -> Option<&Payment> {
        self.payment_history.last()
    }
}

/// Create member payload (intake)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberCreate {
    #[serde(rename = "dni")]
    pub id: MemberId,
    pub name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub plan_type: PlanType,
    #[serde(with = "crate::date_format")]
    pub payment_due_date: NaiveDate,
    #[serde(with = "crate::date_format")]
    pub join_date: NaiveDate,
    #[serde(rename = "medicamento")]
    pub medication: Option<String>,
    #[serde(rename = "patologias")]
    pub conditions: Option<String>,
    #[serde(rename = "activo")]
    pub active: bool,
}

impl MemberCreate {
    /// Fresh member record with empty ledger and attendance log
    pub fn into_member(self) -> Member {
        Member {
            id: self.id,
            name: self.name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            birth_date: self.birth_date,
            plan_type: self.plan_type,
            payment_due_date: self.payment_due_date,
            join_date: Some(self.join_date),
            active: self.active,
            medication: self.medication,
            conditions: self.conditions,
            portrait: None,
            payment_history: Vec::new(),
            attendance_log: Vec::new(),
        }
    }
}

/// Update member payload
///
/// Has no way to address `payment_history` or `attendance_log`: ledger
/// entries only change through the payment operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_type: Option<PlanType>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::date_format::option"
    )]
    pub payment_due_date: Option<NaiveDate>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::date_format::option"
    )]
    pub join_date: Option<NaiveDate>,
    #[serde(rename = "medicamento", skip_serializing_if = "Option::is_none")]
    pub medication: Option<String>,
    #[serde(rename = "patologias", skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
    #[serde(rename = "activo", skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl MemberUpdate {
    /// Patch that only flips the active flag off (soft removal)
    pub fn deactivate() -> Self {
        Self {
            active: Some(false),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the patch in place; the identifier is never touched
    pub fn apply_to(self, member: &mut Member) {
        if let Some(v) = self.name {
            member.name = v;
        }
        if let Some(v) = self.last_name {
            member.last_name = v;
        }
        if let Some(v) = self.email {
            member.email = Some(v);
        }
        if let Some(v) = self.phone {
            member.phone = Some(v);
        }
        if let Some(v) = self.birth_date {
            member.birth_date = Some(v);
        }
        if let Some(v) = self.plan_type {
            member.plan_type = v;
        }
        if let Some(v) = self.payment_due_date {
            member.payment_due_date = v;
        }
        if let Some(v) = self.join_date {
            member.join_date = Some(v);
        }
        if let Some(v) = self.medication {
            member.medication = Some(v);
        }
        if let Some(v) = self.conditions {
            member.conditions = Some(v);
        }
        if let Some(v) = self.active {
            member.active = v;
        }
    }
}
