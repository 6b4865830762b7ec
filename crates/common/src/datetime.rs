//! DateTime utilities.
//!
//! Statistics bucket activity by UTC calendar day; the helpers here are the
//! single definition of that boundary.

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Get the current UTC time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// The UTC calendar day an instant falls on.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc, NaiveDate};
/// use studyhub_common::datetime::utc_day;
///
/// let late = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap();
/// assert_eq!(utc_day(&late), NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
/// ```
pub fn utc_day(datetime: &DateTime<Utc>) -> NaiveDate {
    datetime.date_naive()
}

/// Whole days from `earlier` to `later`; negative if `later` comes first.
pub fn days_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    (later - earlier).num_days()
}

/// The `count` consecutive days ending on `last`, oldest first.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use studyhub_common::datetime::trailing_days;
///
/// let last = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let days = trailing_days(last, 3);
/// assert_eq!(days.first(), NaiveDate::from_ymd_opt(2024, 2, 28).as_ref());
/// assert_eq!(days.last(), Some(&last));
/// ```
pub fn trailing_days(last: NaiveDate, count: u32) -> Vec<NaiveDate> {
    (0..count as i64)
        .rev()
        .map(|offset| last - Duration::days(offset))
        .collect()
}

/// Format a DateTime as an RFC 3339 string.
pub fn format_datetime(datetime: &DateTime<Utc>) -> String {
    datetime.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_utc_day_boundary() {
        let before = Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(days_between(utc_day(&before), utc_day(&after)), 1);
    }

    #[test]
    fn test_trailing_days_crosses_month() {
        let last = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let days = trailing_days(last, 4);
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2024, 2, 28).unwrap());
        assert_eq!(days[1], NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(trailing_days(last, 0).is_empty());
    }

    #[test]
    fn test_format_datetime() {
        let dt = Utc.with_ymd_and_hms(2023, 12, 1, 12, 30, 45).unwrap();
        assert!(format_datetime(&dt).starts_with("2023-12-01T12:30:45"));
    }
}
