//! Shift type detection and daily norm selection.

use chrono::{Datelike, NaiveDateTime, Weekday};
use rust_decimal::Decimal;

use crate::config::{DailyNorms, ShiftWindow};
use crate::models::ShiftType;

/// Classifies a shift by its start time.
///
/// A shift is a night shift if it starts at or after the night start
/// boundary or at or before the night end boundary.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::classify_shift;
/// use payroll_engine::config::PayrollRules;
/// use payroll_engine::models::ShiftType;
/// use chrono::NaiveDateTime;
///
/// let window = PayrollRules::default().shift_window;
/// let evening = NaiveDateTime::parse_from_str("2025-03-10 18:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let morning = NaiveDateTime::parse_from_str("2025-03-10 06:01:00", "%Y-%m-%d %H:%M:%S").unwrap();
///
/// assert_eq!(classify_shift(evening, &window), ShiftType::Night);
/// assert_eq!(classify_shift(morning, &window), ShiftType::Day);
/// ```
pub fn classify_shift(start: NaiveDateTime, window: &ShiftWindow) -> ShiftType {
    let time = start.time();
    if time >= window.night_starts_at || time <= window.night_ends_at {
        ShiftType::Night
    } else {
        ShiftType::Day
    }
}

/// Returns the straight-time ceiling for a shift.
///
/// Night shifts use the night norm on every day. Day shifts starting on a
/// Friday use the shorter Friday norm.
pub fn daily_norm(shift_type: ShiftType, start_day: Weekday, norms: &DailyNorms) -> Decimal {
    match (shift_type, start_day) {
        (ShiftType::Night, _) => norms.night,
        (ShiftType::Day, Weekday::Fri) => norms.friday,
        (ShiftType::Day, _) => norms.day,
    }
}

/// Convenience wrapper over [`classify_shift`] and [`daily_norm`].
pub fn shift_norm(
    start: NaiveDateTime,
    window: &ShiftWindow,
    norms: &DailyNorms,
) -> (ShiftType, Decimal) {
    let shift_type = classify_shift(start, window);
    (shift_type, daily_norm(shift_type, start.weekday(), norms))
}
