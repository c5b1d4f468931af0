//! Attendance aggregation by civil day, week and month
//!
//! Every aggregate is recomputed from the member's raw check-in list.
//! Timestamps are bucketed by the calendar date they fall on in the civil
//! timezone, never by their UTC date.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{AppError, DailyAttendee};

/// Check-ins that fall on `target` in the civil zone, in their original order
pub fn aggregate_by_day(
    timestamps: &[DateTime<Utc>],
    target: NaiveDate,
    tz: Tz,
) -> Vec<DateTime<Utc>> {
    timestamps
        .iter()
        .filter(|ts| ts.with_timezone(&tz).date_naive() == target)
        .copied()
        .collect()
}

/// Week number within the year, weeks starting on Sunday
///
/// `ceil((day_of_year + weekday_of_jan_1) / 7)` with the weekday counted
/// from Sunday = 0.
pub fn week_of_year(date: NaiveDate) -> u32 {
    let jan_1 = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
    let offset = jan_1.weekday().num_days_from_sunday();
    (date.ordinal() + offset).div_ceil(7)
}

/// Check-ins of one week within the selected month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekBucket {
    pub week: u32,
    /// Civil date of the earliest check-in in the bucket
    pub start_date: NaiveDate,
    pub count: usize,
    /// Indexed by weekday, Sunday = 0
    pub per_weekday: [usize; 7],
}

/// Check-ins of `month` (1-12) of `year`, grouped by week number
pub fn aggregate_by_week(
    timestamps: &[DateTime<Utc>],
    month: u32,
    year: i32,
    tz: Tz,
) -> Vec<WeekBucket> {
    let mut weeks: BTreeMap<u32, WeekBucket> = BTreeMap::new();

    for ts in timestamps {
        let date = ts.with_timezone(&tz).date_naive();
        if date.month() != month || date.year() != year {
            continue;
        }

        let week = week_of_year(date);
        let bucket = weeks.entry(week).or_insert_with(|| WeekBucket {
            week,
            start_date: date,
            count: 0,
            per_weekday: [0; 7],
        });
        bucket.count += 1;
        bucket.per_weekday[date.weekday().num_days_from_sunday() as usize] += 1;
        if date < bucket.start_date {
            bucket.start_date = date;
        }
    }

    weeks.into_values().collect()
}

/// Weekly buckets plus month totals
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAttendance {
    pub month: u32,
    pub year: i32,
    pub weeks: Vec<WeekBucket>,
    pub total: usize,
    /// Mean check-ins per week that had any, one decimal
    pub weekly_average: Decimal,
}

pub fn monthly_summary(
    timestamps: &[DateTime<Utc>],
    month: u32,
    year: i32,
    tz: Tz,
) -> MonthlyAttendance {
    let weeks = aggregate_by_week(timestamps, month, year, tz);
    let total: usize = weeks.iter().map(|w| w.count).sum();
    let weekly_average = if weeks.is_empty() {
        Decimal::ZERO
    } else {
        (Decimal::from(total as u64) / Decimal::from(weeks.len() as u64)).round_dp(1)
    };

    MonthlyAttendance {
        month,
        year,
        weeks,
        total,
        weekly_average,
    }
}

/// First column of the month grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    fn first_day(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }

    fn last_day(self) -> Weekday {
        self.first_day().pred()
    }

    /// Column of `day` in a row starting at this weekday
    fn column(self, day: Weekday) -> u32 {
        match self {
            WeekStart::Sunday => day.num_days_from_sunday(),
            WeekStart::Monday => day.num_days_from_monday(),
        }
    }
}

impl FromStr for WeekStart {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sunday" | "sun" | "domingo" => Ok(WeekStart::Sunday),
            "monday" | "mon" | "lunes" => Ok(WeekStart::Monday),
            other => Err(AppError::invalid_format(
                "week_start",
                format!("Unknown week start: {}", other),
            )),
        }
    }
}

/// One day cell of the month grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub day: u32,
    pub date: NaiveDate,
    pub has_attendance: bool,
}

/// Month grid, one row per week, `None` for leading blank cells
pub type MonthCalendar = Vec<Vec<Option<CalendarDay>>>;

pub fn days_in_month(month: u32, year: i32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt()).map(|d| d.day()).unwrap_or(0)
}

/// Month grid with leading padding aligned to `week_start`
///
/// A row closes on the last weekday of the week or on the final day of the
/// month. An invalid month yields an empty grid.
pub fn build_month_calendar(
    month: u32,
    year: i32,
    timestamps: &[DateTime<Utc>],
    tz: Tz,
    week_start: WeekStart,
) -> MonthCalendar {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let last_day = days_in_month(month, year);

    let attended: std::collections::HashSet<NaiveDate> = timestamps
        .iter()
        .map(|ts| ts.with_timezone(&tz).date_naive())
        .filter(|d| d.month() == month && d.year() == year)
        .collect();

    let mut rows = Vec::new();
    let mut row: Vec<Option<CalendarDay>> =
        vec![None; week_start.column(first.weekday()) as usize];

    for (date, day) in first.iter_days().zip(1..=last_day) {
        row.push(Some(CalendarDay {
            day,
            date,
            has_attendance: attended.contains(&date),
        }));

        if date.weekday() == week_start.last_day() || day == last_day {
            rows.push(std::mem::take(&mut row));
        }
    }

    rows
}

/// Selected month with year wrap-around
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    month: u32,
    year: i32,
}

impl MonthCursor {
    /// `None` unless `month` is 1-12
    pub fn new(month: u32, year: i32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { month, year })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            year: date.year(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                month: 12,
                year: self.year - 1,
            }
        } else {
            Self {
                month: self.month - 1,
                year: self.year,
            }
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                month: 1,
                year: self.year + 1,
            }
        } else {
            Self {
                month: self.month + 1,
                year: self.year,
            }
        }
    }

    /// "marzo 2024"
    pub fn label(&self) -> String {
        format!(
            "{} {}",
            crate::clock::month_name(self.month).unwrap_or_default(),
            self.year
        )
    }
}

/// Newest-first copy for history listings
pub fn recent_first(timestamps: &[DateTime<Utc>]) -> Vec<DateTime<Utc>> {
    let mut sorted = timestamps.to_vec();
    sorted.sort_by(|a, b| b.cmp(a));
    sorted
}

/// Case-insensitive match on name, last name, DNI or email
pub fn filter_attendees<'a>(attendees: &'a [DailyAttendee], text: &str) -> Vec<&'a DailyAttendee> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return attendees.iter().collect();
    }

    attendees
        .iter()
        .filter(|a| {
            a.name.to_lowercase().contains(&needle)
                || a.last_name.to_lowercase().contains(&needle)
                || a.id.as_str().contains(&needle)
                || a
                    .email
                    .as_deref()
                    .is_some_and(|e| e.to_lowercase().contains(&needle))
        })
        .collect()
}
