//! Civil clock - every "today" and every calendar-day bucket goes through here
//!
//! Instants are stored as UTC. They are converted into the gym's single
//! civil timezone only when a calendar date is needed, so two terminals in
//! different host zones agree on what "today" means.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use shared::{AppError, AppResult, MembershipStatus};

/// Civil zone used when none is configured
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Argentina::Buenos_Aires;

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Source of the current instant
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests and replays
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(at) }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock() = at;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Clock bound to the gym's civil timezone
#[derive(Clone)]
pub struct CivilCalendar {
    tz: Tz,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for CivilCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CivilCalendar").field("tz", &self.tz).finish()
    }
}

impl CivilCalendar {
    pub fn new(tz: Tz, clock: Arc<dyn Clock>) -> Self {
        Self { tz, clock }
    }

    /// Wall clock in the given zone
    pub fn system(tz: Tz) -> Self {
        Self::new(tz, Arc::new(SystemClock))
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Current civil date
    pub fn today(&self) -> NaiveDate {
        self.date_of(self.now())
    }

    /// Civil date an instant falls on
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// `[start, end)` of a civil day, as UTC instants
    pub fn day_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let next_day = date.succ_opt().unwrap_or(date);
        (
            local_to_utc(date.and_time(NaiveTime::MIN), self.tz),
            local_to_utc(next_day.and_time(NaiveTime::MIN), self.tz),
        )
    }

    /// Standing of a due date as of now
    pub fn status_of(&self, due: NaiveDate) -> MembershipStatus {
        crate::status::resolve_status(due, self.now(), self.tz)
    }
}

/// Local wall time → UTC instant
///
/// An ambiguous wall time resolves to its first occurrence. A wall time
/// skipped by a DST gap resolves to the first valid instant after it.
pub fn local_to_utc(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    (0..=GAP_SEARCH_STEPS)
        .filter_map(|step| naive.checked_add_signed(chrono::Duration::minutes(15 * step)))
        .find_map(|wall| wall.and_local_timezone(tz).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

// Zone offsets move in quarter hours; no gap is longer than a day
const GAP_SEARCH_STEPS: i64 = 24 * 4;

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Parse an IANA zone name, falling back to [`DEFAULT_TIMEZONE`]
pub fn parse_timezone(name: &str) -> Tz {
    name.trim().parse::<Tz>().unwrap_or_else(|e| {
        tracing::warn!(
            "Failed to parse timezone '{}': {}, falling back to {}",
            name,
            e,
            DEFAULT_TIMEZONE
        );
        DEFAULT_TIMEZONE
    })
}

/// "15 de marzo de 2024"
pub fn format_long_date(date: NaiveDate) -> String {
    let month = MONTHS_ES[date.month0() as usize];
    format!("{} de {} de {}", date.day(), month, date.year())
}

/// Spanish month name, 1-based
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTHS_ES.get(month.checked_sub(1)? as usize).copied()
}

/// "15/03/2024 10:30" in the civil zone
pub fn format_date_time(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%d/%m/%Y %H:%M").to_string()
}

/// "$100.00"
pub fn format_amount(amount: Decimal) -> String {
    format!("${:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn calendar_at(rfc3339: &str) -> CivilCalendar {
        let at = DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc);
        CivilCalendar::new(DEFAULT_TIMEZONE, Arc::new(ManualClock::new(at)))
    }

    #[test]
    fn test_today_uses_civil_zone() {
        // 01:30 UTC is still the previous evening in Buenos Aires (UTC-3)
        let calendar = calendar_at("2024-03-16T01:30:00Z");
        assert_eq!(calendar.today(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());

        let calendar = calendar_at("2024-03-16T03:00:00Z");
        assert_eq!(calendar.today(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
    }

    #[test]
    fn test_day_bounds() {
        let calendar = calendar_at("2024-03-15T12:00:00Z");
        let (start, end) = calendar.day_bounds(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 15, 3, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 3, 16, 3, 0, 0).unwrap());
    }

    #[test]
    fn test_day_bounds_dst_gap_opens_at_first_valid_instant() {
        // Sao Paulo skipped from 00:00 to 01:00 on 2018-11-04
        let tz: Tz = "America/Sao_Paulo".parse().unwrap();
        let calendar = CivilCalendar::system(tz);
        let (start, end) = calendar.day_bounds(NaiveDate::from_ymd_opt(2018, 11, 4).unwrap());
        // Day opens at 01:00 local, UTC-2
        assert_eq!(start, Utc.with_ymd_and_hms(2018, 11, 4, 3, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2018, 11, 5, 2, 0, 0).unwrap());
        assert_eq!(calendar.date_of(start), NaiveDate::from_ymd_opt(2018, 11, 4).unwrap());
        assert_eq!(
            calendar.date_of(start - chrono::Duration::seconds(1)),
            NaiveDate::from_ymd_opt(2018, 11, 3).unwrap()
        );
    }

    #[test]
    fn test_ambiguous_wall_time_takes_first_occurrence() {
        // Sao Paulo repeated 23:00-00:00 on 2019-02-16
        let tz: Tz = "America/Sao_Paulo".parse().unwrap();
        let wall = NaiveDate::from_ymd_opt(2019, 2, 16)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap();
        assert_eq!(local_to_utc(wall, tz), Utc.with_ymd_and_hms(2019, 2, 17, 1, 30, 0).unwrap());
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()));
        let calendar = CivilCalendar::new(DEFAULT_TIMEZONE, clock.clone());
        clock.advance(chrono::Duration::days(1));
        assert_eq!(calendar.today(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("15/03/2024").is_err());
    }

    #[test]
    fn test_parse_timezone_fallback() {
        assert_eq!(parse_timezone("Europe/Madrid"), chrono_tz::Europe::Madrid);
        assert_eq!(parse_timezone("Mars/Olympus"), DEFAULT_TIMEZONE);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(
            format_long_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()),
            "15 de marzo de 2024"
        );
        assert_eq!(month_name(12), Some("diciembre"));
        assert_eq!(month_name(0), None);
        assert_eq!(
            format_date_time(Utc.with_ymd_and_hms(2024, 3, 15, 13, 30, 0).unwrap(), DEFAULT_TIMEZONE),
            "15/03/2024 10:30"
        );
        assert_eq!(format_amount(Decimal::from_str("100").unwrap()), "$100.00");
        assert_eq!(format_amount(Decimal::from_str("1500.5").unwrap()), "$1500.50");
    }
}
