//! Membership status resolver

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use shared::MembershipStatus;

/// Standing of a civil due date at instant `now`
///
/// The boundary is inclusive: a member whose due date is today is still
/// current. `now` is converted into `tz` before the comparison.
pub fn resolve_status(due: NaiveDate, now: DateTime<Utc>, tz: Tz) -> MembershipStatus {
    let today = now.with_timezone(&tz).date_naive();
    MembershipStatus::resolve(due, today)
}

/// Same as [`resolve_status`] for a due date stored as an instant in any zone
pub fn resolve_status_at<Z: TimeZone>(
    due: DateTime<Z>,
    now: DateTime<Utc>,
    tz: Tz,
) -> MembershipStatus {
    let due = due.with_timezone(&tz).date_naive();
    resolve_status(due, now, tz)
}
