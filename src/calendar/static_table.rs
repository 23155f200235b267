//! Calendar backed by the configured holiday tables.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, Weekday};

use super::{CalendarProvider, SeasonalEstimateCalendar};
use crate::config::{ConfigLoader, HolidayEntry, PayrollConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::DayClassification;

/// Classifies dates from the holiday tables plus the weekly Sabbath.
///
/// Sabbath entry and exit come from the seasonal times. A holiday without
/// its own `starts_at`/`ends_at` opens at the seasonal entry time on its
/// eve and closes at the seasonal exit time on the day. Years without a
/// holiday table are reported as [`EngineError::CalendarUnavailable`] so a
/// [`super::FallbackCalendar`] can step in.
///
/// # Example
///
/// ```no_run
/// use payroll_engine::calendar::{CalendarProvider, StaticCalendar};
/// use payroll_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/israel")?;
/// let calendar = StaticCalendar::from_loader(&loader);
///
/// let yom_kippur = calendar.classify(NaiveDate::from_ymd_opt(2025, 10, 2).unwrap())?;
/// assert!(yom_kippur.is_holiday);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct StaticCalendar {
    holidays: BTreeMap<NaiveDate, HolidayEntry>,
    years: BTreeSet<i32>,
    weekly: SeasonalEstimateCalendar,
}

impl StaticCalendar {
    /// Builds the calendar from a loaded configuration.
    pub fn from_config(config: &PayrollConfig) -> Self {
        let holidays: BTreeMap<NaiveDate, HolidayEntry> = config
            .holidays()
            .iter()
            .map(|h| (h.date, h.clone()))
            .collect();
        let years = holidays.keys().map(|d| d.year()).collect();

        Self {
            holidays,
            years,
            weekly: SeasonalEstimateCalendar::new(config.seasonal().to_vec()),
        }
    }

    /// Builds the calendar from a [`ConfigLoader`].
    pub fn from_loader(loader: &ConfigLoader) -> Self {
        Self::from_config(loader.config())
    }

    /// Years with a holiday table.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.iter().copied()
    }
}

impl CalendarProvider for StaticCalendar {
    fn classify(&self, date: NaiveDate) -> EngineResult<DayClassification> {
        if !self.years.contains(&date.year()) {
            return Err(EngineError::CalendarUnavailable {
                date,
                message: format!("no holiday table for {}", date.year()),
            });
        }

        let mut classification = self.weekly.weekly(date)?;

        if let Some(holiday) = self.holidays.get(&date) {
            classification.is_holiday = true;
            classification.name = Some(holiday.name.clone());
            if date.weekday() == Weekday::Sat {
                classification.is_special_shabbat = true;
            }
            let (eve_entry, exit) = self.weekly.rest_day_window(date)?;
            classification.start_time = Some(holiday.starts_at.unwrap_or(eve_entry));
            classification.end_time = Some(holiday.ends_at.unwrap_or(exit));
        }

        Ok(classification)
    }
}
