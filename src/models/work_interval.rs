//! Work interval model.
//!
//! A work interval is one check-in/check-out period recorded by the
//! attendance source. Only closed intervals take part in calculation.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Represents a work interval (a shift) for an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkInterval {
    /// Unique identifier for the interval.
    pub id: String,
    /// The employee the interval belongs to.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// Check-in time.
    pub start: NaiveDateTime,
    /// Check-out time; `None` while the shift is still open.
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
}

impl WorkInterval {
    /// Creates a closed interval.
    pub fn closed(
        id: impl Into<String>,
        employee_id: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            employee_id: Some(employee_id.into()),
            start,
            end: Some(end),
        }
    }

    /// Creates an open interval (checked in, not yet checked out).
    pub fn open(id: impl Into<String>, employee_id: impl Into<String>, start: NaiveDateTime) -> Self {
        Self {
            id: id.into(),
            employee_id: Some(employee_id.into()),
            start,
            end: None,
        }
    }

    /// Returns true if the interval has an end time.
    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    /// The calendar date the interval is attributed to (its start date).
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Returns the day of the week the interval starts on.
    pub fn day_of_week(&self) -> Weekday {
        self.start.weekday()
    }

    /// Returns the worked minutes, zero for open or inverted intervals.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::WorkInterval;
    /// use chrono::NaiveDateTime;
    ///
    /// let interval = WorkInterval::closed(
    ///     "wl_001",
    ///     "emp_001",
    ///     NaiveDateTime::parse_from_str("2025-03-10 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
    ///     NaiveDateTime::parse_from_str("2025-03-10 16:36:00", "%Y-%m-%d %H:%M:%S").unwrap(),
    /// );
    /// assert_eq!(interval.worked_minutes(), 516);
    /// ```
    pub fn worked_minutes(&self) -> i64 {
        match self.end {
            Some(end) if end > self.start => (end - self.start).num_minutes(),
            _ => 0,
        }
    }

    /// Returns the employee reference or a data integrity error.
    pub fn employee(&self) -> EngineResult<&str> {
        match self.employee_id.as_deref() {
            Some(id) if !id.trim().is_empty() => Ok(id),
            _ => Err(EngineError::InvalidInterval {
                interval_id: self.id.clone(),
                message: "missing employee reference".to_string(),
            }),
        }
    }

    /// Validates the interval.
    ///
    /// An interval is malformed when it has no employee reference or when
    /// its end precedes its start. Open intervals are not malformed.
    pub fn validate(&self) -> EngineResult<()> {
        self.employee()?;

        match self.end {
            Some(end) if end < self.start => Err(EngineError::InvalidInterval {
                interval_id: self.id.clone(),
                message: format!("end {} is before start {}", end, self.start),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    /// WI-001: eight hour interval
    #[test]
    fn test_eight_hour_interval_minutes() {
        let interval = WorkInterval::closed(
            "WI-001",
            "emp_001",
            make_datetime("2025-03-10", "09:00:00"),
            make_datetime("2025-03-10", "17:00:00"),
        );
        assert_eq!(interval.worked_minutes(), 480);
        assert!(interval.validate().is_ok());
    }

    /// WI-002: open interval counts zero minutes
    #[test]
    fn test_open_interval_has_zero_minutes() {
        let interval = WorkInterval::open("WI-002", "emp_001", make_datetime("2025-03-10", "09:00:00"));
        assert!(!interval.is_closed());
        assert_eq!(interval.worked_minutes(), 0);
        assert!(interval.validate().is_ok());
    }

    /// WI-003: overnight interval
    #[test]
    fn test_overnight_interval() {
        let interval = WorkInterval::closed(
            "WI-003",
            "emp_001",
            make_datetime("2025-03-10", "22:00:00"),
            make_datetime("2025-03-11", "06:00:00"),
        );
        assert_eq!(interval.worked_minutes(), 480);
        assert_eq!(interval.date(), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
    }

    #[test]
    fn test_end_before_start_is_invalid() {
        let interval = WorkInterval::closed(
            "WI-004",
            "emp_001",
            make_datetime("2025-03-10", "17:00:00"),
            make_datetime("2025-03-10", "09:00:00"),
        );

        match interval.validate() {
            Err(EngineError::InvalidInterval { interval_id, message }) => {
                assert_eq!(interval_id, "WI-004");
                assert!(message.contains("before start"));
            }
            other => panic!("Expected InvalidInterval, got {:?}", other),
        }
        assert_eq!(interval.worked_minutes(), 0);
    }

    #[test]
    fn test_missing_employee_is_invalid() {
        let mut interval = WorkInterval::closed(
            "WI-005",
            "emp_001",
            make_datetime("2025-03-10", "09:00:00"),
            make_datetime("2025-03-10", "17:00:00"),
        );
        interval.employee_id = None;
        assert!(interval.validate().is_err());

        interval.employee_id = Some("  ".to_string());
        assert!(interval.validate().is_err());
    }

    #[test]
    fn test_interval_deserialization_without_end() {
        let json = r#"{
            "id": "wl_77",
            "employee_id": "emp_003",
            "start": "2025-03-10T08:00:00"
        }"#;

        let interval: WorkInterval = serde_json::from_str(json).unwrap();
        assert_eq!(interval.id, "wl_77");
        assert!(interval.end.is_none());
    }

    #[test]
    fn test_day_of_week() {
        // 2025-03-14 is a Friday
        let interval = WorkInterval::closed(
            "wl_1",
            "emp_001",
            make_datetime("2025-03-14", "08:00:00"),
            make_datetime("2025-03-14", "14:00:00"),
        );
        assert_eq!(interval.day_of_week(), Weekday::Fri);
    }
}
