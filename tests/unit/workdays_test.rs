// Working-day calculator: fixed cases plus properties.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use proptest::prelude::*;
use servicedesk::core::workdays::working_days;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_same_day_is_one_working_day() {
    // Weekday, Saturday and Sunday starts all count as a single day
    assert_eq!(working_days(date(2024, 1, 1), date(2024, 1, 1)).unwrap(), 1);
    assert_eq!(working_days(date(2024, 1, 6), date(2024, 1, 6)).unwrap(), 1);
    assert_eq!(working_days(date(2024, 1, 7), date(2024, 1, 7)).unwrap(), 1);
}

#[test]
fn test_monday_to_sunday_spans_five_working_days() {
    // 2024-01-01 is a Monday: the start day plus Tue-Fri, weekend excluded
    assert_eq!(working_days(date(2024, 1, 1), date(2024, 1, 7)).unwrap(), 5);
}

#[test]
fn test_weekend_only_span() {
    // Saturday start counts as one day; Sunday adds nothing
    assert_eq!(working_days(date(2024, 1, 6), date(2024, 1, 7)).unwrap(), 1);
    // Crossing into Monday adds a working day
    assert_eq!(working_days(date(2024, 1, 6), date(2024, 1, 8)).unwrap(), 2);
}

#[test]
fn test_full_working_week() {
    // Mon - Fri inclusive
    assert_eq!(working_days(date(2024, 1, 1), date(2024, 1, 5)).unwrap(), 5);
    // Saturday end adds nothing on top
    assert_eq!(working_days(date(2024, 1, 1), date(2024, 1, 6)).unwrap(), 5);
}

#[test]
fn test_two_calendar_weeks() {
    // Mon Jan 1 through Fri Jan 12: 10 working days
    assert_eq!(working_days(date(2024, 1, 1), date(2024, 1, 12)).unwrap(), 10);
}

#[test]
fn test_end_before_start_fails() {
    assert!(working_days(date(2024, 1, 10), date(2024, 1, 9)).is_err());
}

proptest! {
    /// The function is pure: recomputation never changes the answer
    #[test]
    fn prop_recomputation_is_stable(start_offset in 0i64..15000, span in 0i64..400) {
        let start = date(2000, 1, 1) + Duration::days(start_offset);
        let end = start + Duration::days(span);

        let first = working_days(start, end).unwrap();
        let second = working_days(start, end).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Result is at least 1 and never exceeds the calendar span
    #[test]
    fn prop_result_bounds(start_offset in 0i64..15000, span in 0i64..400) {
        let start = date(2000, 1, 1) + Duration::days(start_offset);
        let end = start + Duration::days(span);

        let days = working_days(start, end).unwrap();
        prop_assert!(days >= 1);
        prop_assert!(days <= span + 1);
    }

    /// Extending the end date never shrinks the duration, and a full
    /// extra week adds exactly five working days
    #[test]
    fn prop_monotone_and_weekly_increment(start_offset in 0i64..15000, span in 0i64..100) {
        let start = date(2000, 1, 1) + Duration::days(start_offset);
        let end = start + Duration::days(span);

        let base = working_days(start, end).unwrap();
        let extended = working_days(start, end + Duration::days(1)).unwrap();
        prop_assert!(extended >= base);

        let week_later = working_days(start, end + Duration::days(7)).unwrap();
        prop_assert_eq!(week_later, base + 5);
    }

    /// Weekend days after the start never contribute
    #[test]
    fn prop_weekends_excluded(start_offset in 0i64..15000) {
        let start = date(2000, 1, 1) + Duration::days(start_offset);
        let mut expected = 1i64;
        let mut current = start;
        for _ in 0..30 {
            current += Duration::days(1);
            if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                expected += 1;
            }
        }
        prop_assert_eq!(working_days(start, start + Duration::days(30)).unwrap(), expected);
    }
}
