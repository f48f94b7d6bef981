//! Next-due computation and the calendar-day helpers the classifier shares.
//!
//! All arithmetic is done on calendar days in local wall-clock time; the time
//! of day of a completion never moves its due date.

use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime};

/// Next date a chore is due.
///
/// A chore that was never completed is due on `now`'s date. Otherwise the
/// interval is added once to the completion date, so a long-overdue chore
/// keeps a due date far in the past and the classifier decides how late it
/// is. An interval of zero yields the completion date itself.
pub fn next_due(
    last_completed:  Option<NaiveDateTime>,
    recurrence_days: u32,
    now:             NaiveDateTime,
) -> NaiveDate {
    match last_completed {
        None => now.date(),
        Some(last) => last
            .date()
            .checked_add_days(Days::new(u64::from(recurrence_days)))
            .unwrap_or(NaiveDate::MAX),
    }
}

/// Signed number of calendar days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

pub fn is_same_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date()
}

/// Parses a boundary timestamp into local wall-clock time.
///
/// Accepts `YYYY-MM-DD` (midnight), RFC 3339 (converted to the local zone)
/// and naive `YYYY-MM-DDTHH:MM:SS[.f]`.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn never_completed_is_due_now() {
        let now = at(2024, 5, 10, 18, 30);
        assert_eq!(next_due(None, 30, now), now.date());
    }

    #[test]
    fn adds_interval_in_calendar_days() {
        let now  = at(2024, 5, 10, 8, 0);
        let last = at(2024, 4, 25, 23, 59);
        assert_eq!(next_due(Some(last), 7, now), NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    }

    #[test]
    fn zero_interval_returns_completion_date() {
        let now  = at(2024, 5, 10, 8, 0);
        let last = at(2024, 5, 1, 12, 0);
        assert_eq!(next_due(Some(last), 0, now), last.date());
    }

    #[test]
    fn interval_crosses_month_and_leap_day() {
        let now  = at(2024, 3, 10, 8, 0);
        let last = at(2024, 2, 27, 9, 0);
        assert_eq!(next_due(Some(last), 3, now), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn huge_interval_saturates() {
        let now  = at(2024, 3, 10, 8, 0);
        let last = at(2024, 2, 27, 9, 0);
        assert_eq!(next_due(Some(last), u32::MAX, now), NaiveDate::MAX);
    }

    #[test]
    fn long_overdue_chore_does_not_roll_forward() {
        let now  = at(2024, 5, 10, 8, 0);
        let last = at(2023, 1, 1, 8, 0);
        assert_eq!(next_due(Some(last), 1, now), NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());
    }

    #[test]
    fn day_difference_is_signed() {
        let a = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 5, 4).unwrap();
        assert_eq!(days_between(a, b), 3);
        assert_eq!(days_between(b, a), -3);
    }

    #[test]
    fn same_day_ignores_time() {
        assert!(is_same_day(at(2024, 5, 1, 0, 1), at(2024, 5, 1, 23, 59)));
        assert!(!is_same_day(at(2024, 4, 30, 23, 59), at(2024, 5, 1, 0, 1)));
    }

    #[test]
    fn parses_boundary_formats() {
        assert_eq!(parse_timestamp("2024-05-01"), Some(at(2024, 5, 1, 0, 0)));
        assert_eq!(parse_timestamp("2024-05-01T07:45:00"), Some(at(2024, 5, 1, 7, 45)));

        let utc = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z").unwrap();
        assert_eq!(
            parse_timestamp("2024-05-01T12:00:00Z"),
            Some(utc.with_timezone(&Local).naive_local())
        );

        assert_eq!(parse_timestamp("last tuesday"), None);
        assert_eq!(parse_timestamp("2024-13-01"), None);
    }
}
