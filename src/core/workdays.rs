use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::core::{AppError, Result};

/// Elapsed business days between two calendar dates, weekends excluded.
///
/// The start date always counts as one day, so `working_days(d, d) == 1`.
/// For longer spans the result is 1 plus the number of Monday-Friday days
/// strictly after `start` up to and including `end`.
///
/// # Errors
/// Returns `InvalidRange` when `end` is before `start`.
pub fn working_days(start: NaiveDate, end: NaiveDate) -> Result<i64> {
    if end < start {
        return Err(AppError::invalid_range(format!(
            "end date {} is before start date {}",
            end, start
        )));
    }

    if start == end {
        return Ok(1);
    }

    let mut days = 0;
    let mut current = start + Duration::days(1);
    while current <= end {
        // Monday..=Friday only
        if current.weekday().num_days_from_monday() < 5 {
            days += 1;
        }
        current += Duration::days(1);
    }

    // The start date itself counts as a (possibly partial) day of work
    Ok(days + 1)
}

/// Working days from `start` up to today.
///
/// Used for the live duration of requests that are still open. A start date
/// in the future reads as a single day rather than an error.
pub fn working_days_until_today(start: NaiveDate) -> Result<i64> {
    let today = Local::now().date_naive();
    working_days(start, today.max(start))
}
