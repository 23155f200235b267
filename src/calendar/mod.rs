//! Holiday and Sabbath calendar.
//!
//! The engine consults a [`CalendarProvider`] to learn whether a date is
//! an official holiday or Sabbath and where its premium window starts and
//! ends. Three providers ship with the crate:
//!
//! - [`StaticCalendar`]: configured holiday tables plus the weekly Sabbath
//! - [`SeasonalEstimateCalendar`]: estimated Sabbath times only
//! - [`FallbackCalendar`]: a primary provider backed by the estimate

mod fallback;
mod seasonal;
mod static_table;

use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::models::{DayClassification, WorkInterval};

pub use fallback::FallbackCalendar;
pub use seasonal::SeasonalEstimateCalendar;
pub use static_table::StaticCalendar;

/// Source of calendar classifications.
pub trait CalendarProvider: Send + Sync {
    /// Classifies a single date.
    ///
    /// Fails with [`EngineError::CalendarUnavailable`] when the provider
    /// cannot answer.
    fn classify(&self, date: NaiveDate) -> EngineResult<DayClassification>;
}

impl<P: CalendarProvider + ?Sized> CalendarProvider for Arc<P> {
    fn classify(&self, date: NaiveDate) -> EngineResult<DayClassification> {
        (**self).classify(date)
    }
}

impl<P: CalendarProvider + ?Sized> CalendarProvider for &P {
    fn classify(&self, date: NaiveDate) -> EngineResult<DayClassification> {
        (**self).classify(date)
    }
}

/// Resolves the classifications governing a shift.
///
/// Every date the shift touches is inspected, plus the following date,
/// because a Saturday's Sabbath window opens on Friday evening. Every
/// special day whose premium window overlaps the shift is returned, in
/// date order, so a shift running from one holiday into the next (or from
/// a holiday into the Sabbath) is paid under both. When none overlaps, a
/// single ordinary classification of the start date is returned, keeping
/// the provider's `is_estimated` flag.
///
/// # Example
///
/// ```
/// use payroll_engine::calendar::{classify_interval, SeasonalEstimateCalendar};
/// use payroll_engine::config::SeasonalTimes;
/// use payroll_engine::models::WorkInterval;
/// use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
///
/// let calendar = SeasonalEstimateCalendar::new(
///     (1..=12)
///         .map(|month| SeasonalTimes {
///             month,
///             enters_at: NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
///             exits_at: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
///         })
///         .collect(),
/// );
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// // Friday afternoon into the evening
/// let interval = WorkInterval::closed("wl_1", "emp_001", at("2025-03-14 14:00:00"), at("2025-03-14 22:00:00"));
///
/// let classifications = classify_interval(&calendar, &interval).unwrap();
/// assert_eq!(classifications.len(), 1);
/// assert!(classifications[0].is_shabbat);
/// assert_eq!(classifications[0].date, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
/// ```
pub fn classify_interval<C: CalendarProvider + ?Sized>(
    calendar: &C,
    interval: &WorkInterval,
) -> EngineResult<Vec<DayClassification>> {
    let start = interval.start;
    let end = interval.end.unwrap_or(start).max(start);

    let first = start.date();
    let last = end
        .date()
        .succ_opt()
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("interval {} ends at the end of the calendar", interval.id),
        })?;

    let mut special = Vec::new();
    let mut plain = None;
    for date in first.iter_days().take_while(|d| *d <= last) {
        let classification = calendar.classify(date)?;
        if plain.is_none() {
            let mut ordinary = DayClassification::ordinary(date);
            ordinary.is_estimated = classification.is_estimated;
            plain = Some(ordinary);
        }
        if classification.overlaps(start, end) {
            special.push(classification);
        }
    }

    if !special.is_empty() {
        return Ok(special);
    }

    plain.map(|ordinary| vec![ordinary]).ok_or_else(|| EngineError::CalculationError {
        message: format!("no calendar dates for interval {}", interval.id),
    })
}
