//! Month boundaries and working-day counts.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::{EngineError, EngineResult};

/// Returns the first and last date of a month.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::month_bounds;
/// use chrono::NaiveDate;
///
/// let (first, last) = month_bounds(2024, 2).unwrap();
/// assert_eq!(first, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
/// assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// ```
pub fn month_bounds(year: i32, month: u32) -> EngineResult<(NaiveDate, NaiveDate)> {
    let invalid = || EngineError::CalculationError {
        message: format!("{}-{:02} is not a valid month", year, month),
    };

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    let last = next_first.pred_opt().ok_or_else(invalid)?;

    Ok((first, last))
}

/// Counts the dates in a month whose weekday is in `work_week`.
///
/// Holidays are not subtracted.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::working_days_in_month;
/// use chrono::Weekday;
///
/// let work_week = [Weekday::Sun, Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu];
/// // March 2025 has 5 Sundays, 5 Mondays and 4 each of Tue/Wed/Thu
/// assert_eq!(working_days_in_month(2025, 3, &work_week).unwrap(), 22);
/// ```
pub fn working_days_in_month(year: i32, month: u32, work_week: &[Weekday]) -> EngineResult<u32> {
    let (first, last) = month_bounds(year, month)?;
    let count = first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| work_week.contains(&d.weekday()))
        .count();
    Ok(count as u32)
}

/// True if `date` falls in the given month.
pub fn in_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}
