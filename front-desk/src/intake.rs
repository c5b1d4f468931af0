//! Member intake form validation
//!
//! Raw form strings go in, a checked [`MemberCreate`] / [`MemberUpdate`]
//! comes out. Every failure names the offending field so it can be shown
//! next to the input.

use chrono::NaiveDate;
use shared::{AppError, AppResult, Member, MemberCreate, MemberId, MemberUpdate, PlanType};

use crate::clock;

// ── Text length limits ──────────────────────────────────────────────

/// First and last names
pub const MAX_NAME_LEN: usize = 100;

/// Phone numbers
pub const MAX_SHORT_TEXT_LEN: usize = 50;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Medication / medical conditions
pub const MAX_NOTE_LEN: usize = 500;

/// Shown when no medication is declared
pub const DEFAULT_MEDICATION: &str = "Ninguno";

/// Shown when no condition is declared
pub const DEFAULT_CONDITIONS: &str = "Ninguna";

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::required_field(field));
    }
    check_len(value, field, max_len)?;
    Ok(value.to_string())
}

/// Blank means absent; otherwise within the length limit.
pub fn validate_optional_text(
    value: &str,
    field: &str,
    max_len: usize,
) -> AppResult<Option<String>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    check_len(value, field, max_len)?;
    Ok(Some(value.to_string()))
}

fn check_len(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::invalid_format(
            field,
            format!("{field} is too long ({len} chars, max {max_len})"),
        ));
    }
    Ok(())
}

fn required_date(value: &str, field: &str) -> AppResult<NaiveDate> {
    optional_date(value, field)?.ok_or_else(|| AppError::required_field(field))
}

fn optional_date(value: &str, field: &str) -> AppResult<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    // Edit forms are pre-filled from full timestamps; keep the written date
    let date_part = value.split('T').next().unwrap_or(value);
    clock::parse_date(date_part)
        .map(Some)
        .map_err(|_| AppError::invalid_format(field, format!("Invalid date: {value}")))
}

fn plan(value: &str) -> AppResult<PlanType> {
    if value.trim().is_empty() {
        return Err(AppError::required_field("planType"));
    }
    value.parse()
}

fn email(value: &str) -> AppResult<Option<String>> {
    let email = validate_optional_text(value, "email", MAX_EMAIL_LEN)?;
    if let Some(e) = &email
        && !e.contains('@')
    {
        return Err(AppError::invalid_format("email", format!("Invalid email: {e}")));
    }
    Ok(email)
}

fn note(value: &str, field: &str, default: &str) -> AppResult<Option<String>> {
    Ok(Some(
        validate_optional_text(value, field, MAX_NOTE_LEN)?.unwrap_or_else(|| default.to_string()),
    ))
}

/// Raw intake form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDraft {
    pub dni: String,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: String,
    pub plan_type: String,
    pub payment_due_date: String,
    /// Blank means today
    pub join_date: String,
    pub medication: String,
    pub conditions: String,
    pub active: bool,
}

impl Default for MemberDraft {
    fn default() -> Self {
        Self {
            dni: String::new(),
            name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            birth_date: String::new(),
            plan_type: PlanType::Full.label().to_string(),
            payment_due_date: String::new(),
            join_date: String::new(),
            medication: DEFAULT_MEDICATION.to_string(),
            conditions: DEFAULT_CONDITIONS.to_string(),
            active: true,
        }
    }
}

impl MemberDraft {
    /// Edit form pre-filled from an existing record
    pub fn from_member(member: &Member) -> Self {
        Self {
            dni: member.id.to_string(),
            name: member.name.clone(),
            last_name: member.last_name.clone(),
            email: member.email.clone().unwrap_or_default(),
            phone: member.phone.clone().unwrap_or_default(),
            birth_date: member.birth_date.clone().unwrap_or_default(),
            plan_type: member.plan_type.label().to_string(),
            payment_due_date: member.payment_due_date.format("%Y-%m-%d").to_string(),
            join_date: member
                .join_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            medication: member
                .medication
                .clone()
                .unwrap_or_else(|| DEFAULT_MEDICATION.to_string()),
            conditions: member
                .conditions
                .clone()
                .unwrap_or_else(|| DEFAULT_CONDITIONS.to_string()),
            active: member.active,
        }
    }
}

/// Check a new-member form
pub fn validate(draft: &MemberDraft, today: NaiveDate) -> AppResult<MemberCreate> {
    if draft.dni.trim().is_empty() {
        return Err(AppError::required_field("dni"));
    }
    let id = MemberId::parse(&draft.dni)?;

    Ok(MemberCreate {
        id,
        name: validate_required_text(&draft.name, "name", MAX_NAME_LEN)?,
        last_name: validate_required_text(&draft.last_name, "lastName", MAX_NAME_LEN)?,
        email: email(&draft.email)?,
        phone: validate_optional_text(&draft.phone, "phone", MAX_SHORT_TEXT_LEN)?,
        birth_date: optional_date(&draft.birth_date, "birthDate")?
            .map(|d| d.format("%Y-%m-%d").to_string()),
        plan_type: plan(&draft.plan_type)?,
        payment_due_date: required_date(&draft.payment_due_date, "paymentDueDate")?,
        join_date: optional_date(&draft.join_date, "joinDate")?.unwrap_or(today),
        medication: note(&draft.medication, "medicamento", DEFAULT_MEDICATION)?,
        conditions: note(&draft.conditions, "patologias", DEFAULT_CONDITIONS)?,
        active: draft.active,
    })
}

/// Check an edit form; the DNI is the record key and is not patched
pub fn validate_update(draft: &MemberDraft) -> AppResult<MemberUpdate> {
    Ok(MemberUpdate {
        name: Some(validate_required_text(&draft.name, "name", MAX_NAME_LEN)?),
        last_name: Some(validate_required_text(
            &draft.last_name,
            "lastName",
            MAX_NAME_LEN,
        )?),
        email: email(&draft.email)?,
        phone: validate_optional_text(&draft.phone, "phone", MAX_SHORT_TEXT_LEN)?,
        birth_date: optional_date(&draft.birth_date, "birthDate")?
            .map(|d| d.format("%Y-%m-%d").to_string()),
        plan_type: Some(plan(&draft.plan_type)?),
        payment_due_date: Some(required_date(&draft.payment_due_date, "paymentDueDate")?),
        join_date: optional_date(&draft.join_date, "joinDate")?,
        medication: note(&draft.medication, "medicamento", DEFAULT_MEDICATION)?,
        conditions: note(&draft.conditions, "patologias", DEFAULT_CONDITIONS)?,
        active: Some(draft.active),
    })
}
