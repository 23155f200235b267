//! Degraded-mode calendar.

use chrono::NaiveDate;
use tracing::warn;

use super::{CalendarProvider, SeasonalEstimateCalendar};
use crate::error::{EngineError, EngineResult};
use crate::models::DayClassification;

/// Wraps a primary provider and answers from the seasonal estimate when the
/// primary reports [`EngineError::CalendarUnavailable`].
///
/// Estimated answers carry `is_estimated = true`, which the monthly summary
/// surfaces as a `calendar_estimated` warning. Other errors pass through.
#[derive(Debug, Clone)]
pub struct FallbackCalendar<P> {
    primary: P,
    estimate: SeasonalEstimateCalendar,
}

impl<P: CalendarProvider> FallbackCalendar<P> {
    /// Creates a fallback over `primary`.
    pub fn new(primary: P, estimate: SeasonalEstimateCalendar) -> Self {
        Self { primary, estimate }
    }

    /// The wrapped provider.
    pub fn primary(&self) -> &P {
        &self.primary
    }
}

impl<P: CalendarProvider> CalendarProvider for FallbackCalendar<P> {
    fn classify(&self, date: NaiveDate) -> EngineResult<DayClassification> {
        match self.primary.classify(date) {
            Err(EngineError::CalendarUnavailable { message, .. }) => {
                warn!(
                    date = %date,
                    error = %message,
                    "Calendar unavailable, using seasonal estimate"
                );
                self.estimate.classify(date)
            }
            other => other,
        }
    }
}
