//! Civil-date serde helpers
//!
//! Date-only fields (due date, join date) travel as `YYYY-MM-DD`, but the
//! collaborator may also send a full ISO-8601 timestamp such as
//! `2024-03-15T00:00:00.000Z`. The calendar date as written is kept; it is
//! never shifted through a timezone, which is what produces off-by-one days
//! when a UTC midnight is rendered west of Greenwich. Records exported
//! from the document store may carry extended-JSON dates
//! (`{"$date": "2024-03-15T00:00:00.000Z"}`); those read the same way.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date as it arrives on the wire
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Plain(String),
    Extended {
        #[serde(rename = "$date")]
        date: String,
    },
}

impl RawDate {
    fn into_string(self) -> String {
        match self {
            RawDate::Plain(raw) | RawDate::Extended { date: raw } => raw,
        }
    }
}

/// Parse a civil date from `YYYY-MM-DD` or the date part of an ISO timestamp
pub fn parse_civil_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.trim().split('T').next()?;
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
}

pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&date.format(DATE_FORMAT))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = RawDate::deserialize(deserializer)?.into_string();
    parse_civil_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid civil date: {raw}")))
}

/// Same as the parent module, for optional fields
///
/// Empty strings and `null` both read as `None`.
pub mod option {
    use super::*;

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => super::serialize(d, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<RawDate>::deserialize(deserializer)?.map(RawDate::into_string) {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_civil_date(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid civil date: {raw}"))),
        }
    }
}
