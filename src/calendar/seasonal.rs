//! Seasonal Sabbath estimate.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use super::CalendarProvider;
use crate::config::SeasonalTimes;
use crate::error::{EngineError, EngineResult};
use crate::models::DayClassification;

/// Classifies dates from per-month estimated Sabbath times alone.
///
/// It knows nothing about holidays, so every answer is flagged
/// `is_estimated`.
///
/// # Example
///
/// ```
/// use payroll_engine::calendar::{CalendarProvider, SeasonalEstimateCalendar};
/// use payroll_engine::config::SeasonalTimes;
/// use chrono::{NaiveDate, NaiveTime};
///
/// let months = (1..=12)
///     .map(|month| SeasonalTimes {
///         month,
///         enters_at: NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
///         exits_at: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
///     })
///     .collect();
/// let calendar = SeasonalEstimateCalendar::new(months);
///
/// let saturday = calendar.classify(NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()).unwrap();
/// assert!(saturday.is_shabbat);
/// assert!(saturday.is_estimated);
/// ```
#[derive(Debug, Clone)]
pub struct SeasonalEstimateCalendar {
    months: Vec<SeasonalTimes>,
}

impl SeasonalEstimateCalendar {
    /// Creates an estimate from per-month times.
    pub fn new(months: Vec<SeasonalTimes>) -> Self {
        Self { months }
    }

    /// Returns the estimated `(entry, exit)` of a rest day falling on `date`.
    ///
    /// The window opens on the eve at the month's entry time and closes on
    /// `date` at the exit time. Sabbaths and holidays share this shape.
    pub fn rest_day_window(
        &self,
        date: NaiveDate,
    ) -> EngineResult<(chrono::NaiveDateTime, chrono::NaiveDateTime)> {
        let times = self
            .months
            .iter()
            .find(|m| m.month == date.month())
            .ok_or_else(|| EngineError::CalendarUnavailable {
                date,
                message: format!("no seasonal estimate for month {}", date.month()),
            })?;

        let eve = date - Duration::days(1);
        Ok((eve.and_time(times.enters_at), date.and_time(times.exits_at)))
    }

    /// Classifies without flagging the answer as estimated.
    pub(crate) fn weekly(&self, date: NaiveDate) -> EngineResult<DayClassification> {
        let mut classification = DayClassification::ordinary(date);
        if date.weekday() == Weekday::Sat {
            let (start, end) = self.rest_day_window(date)?;
            classification.is_shabbat = true;
            classification.start_time = Some(start);
            classification.end_time = Some(end);
        }
        Ok(classification)
    }
}

impl CalendarProvider for SeasonalEstimateCalendar {
    fn classify(&self, date: NaiveDate) -> EngineResult<DayClassification> {
        let mut classification = self.weekly(date)?;
        classification.is_estimated = true;
        Ok(classification)
    }
}
