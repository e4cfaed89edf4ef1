#![forbid(unsafe_code)]
mod common;

use chrono::{NaiveTime, TimeZone, Timelike, Utc};
use common::{date, PARIS};
use roulement::time::{self, get_period, Period};
use roulement::SchedError;

#[test]
fn march_in_paris_spans_dst_change() {
    let period = get_period(2025, 3, "Europe/Paris").unwrap();
    assert_eq!(period.start, Utc.with_ymd_and_hms(2025, 2, 28, 23, 0, 0).unwrap());
    // heure d'été dès le 30 mars : minuit du 1er avril = 22:00 UTC
    let expected_end = Utc.with_ymd_and_hms(2025, 3, 31, 21, 59, 59).unwrap()
        + chrono::Duration::milliseconds(999);
    assert_eq!(period.end, expected_end);

    let zoned = period.zoned();
    assert_eq!(zoned.num_days(), 31);
    assert_eq!(zoned.first_date(), date(2025, 3, 1));
    assert_eq!(zoned.last_date(), date(2025, 3, 31));
}

#[test]
fn february_leap_year_counts_calendar_days() {
    let period = get_period(2024, 2, "America/New_York").unwrap();
    assert_eq!(period.zoned().num_days(), 29);
    assert_eq!(period.zoned().date_at(28), date(2024, 2, 29));
}

#[test]
fn period_errors_are_named() {
    assert!(matches!(
        get_period(2025, 13, "UTC"),
        Err(SchedError::InvalidPeriod { year: 2025, month: 13 })
    ));
    assert!(matches!(
        get_period(2025, 1, "Mars/Olympus"),
        Err(SchedError::UnknownTimeZone(_))
    ));
    assert!(matches!(
        Period::from_dates(date(2025, 6, 6), date(2025, 6, 2), PARIS),
        Err(SchedError::InvalidDateRange { .. })
    ));
}

#[test]
fn contains_is_inclusive() {
    let period = get_period(2025, 6, "Europe/Paris").unwrap();
    assert!(period.contains(period.start));
    assert!(period.contains(period.end));
    assert!(!period.contains(period.end + chrono::Duration::milliseconds(1)));
}

#[test]
fn nonexistent_local_time_moves_past_gap() {
    // 2025-03-30 02:30 n'existe pas à Paris
    let t = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
    let resolved = time::at_local(date(2025, 3, 30), t, PARIS);
    assert_eq!(resolved.hour(), 3);
    assert_eq!(resolved.with_timezone(&Utc), Utc.with_ymd_and_hms(2025, 3, 30, 1, 0, 0).unwrap());
}

#[test]
fn ambiguous_local_time_takes_earliest() {
    // 2025-10-26 02:30 existe deux fois à Paris
    let t = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
    let resolved = time::at_local(date(2025, 10, 26), t, PARIS);
    assert_eq!(resolved.with_timezone(&Utc), Utc.with_ymd_and_hms(2025, 10, 26, 0, 30, 0).unwrap());
}

#[test]
fn time_of_day_parsing() {
    assert_eq!(time::parse_time_of_day("09:00").unwrap(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    assert_eq!(time::parse_time_of_day("23:59:30").unwrap(), NaiveTime::from_hms_opt(23, 59, 30).unwrap());
    assert!(matches!(time::parse_time_of_day("9h"), Err(SchedError::InvalidTime(_))));
    assert_eq!(time::weekday_number(date(2025, 6, 2)), 1);
    assert_eq!(time::weekday_number(date(2025, 6, 8)), 7);
}
