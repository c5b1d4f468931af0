//! Attendance-by-date report model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::member::MemberId;

/// A member who checked in on the queried day, with that day's check-ins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAttendee {
    #[serde(rename = "dni")]
    pub id: MemberId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "asistenciasEseDia", default)]
    pub check_ins: Vec<DateTime<Utc>>,
}

/// Response of the attendance-by-date endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyAttendanceReport {
    #[serde(rename = "cantidad", default)]
    pub count: Option<usize>,
    #[serde(rename = "alumnos", default)]
    pub attendees: Vec<DailyAttendee>,
}

impl DailyAttendanceReport {
    /// Reported total, falling back to the number of rows
    pub fn total(&self) -> usize {
        self.count.unwrap_or(self.attendees.len())
    }
}
