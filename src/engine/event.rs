//! Attendance change notifications.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// What happened to an attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A new interval was recorded.
    Created,
    /// An interval's times changed.
    Edited,
    /// An interval was hidden from calculation.
    SoftDeleted,
    /// A soft-deleted interval was brought back.
    Restored,
}

/// Identifies one employee's payroll month.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthKey {
    /// The employee.
    pub employee_id: String,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
}

impl MonthKey {
    /// Creates a key.
    pub fn new(employee_id: impl Into<String>, year: i32, month: u32) -> Self {
        Self {
            employee_id: employee_id.into(),
            year,
            month,
        }
    }

    /// The key of the month containing `date`.
    pub fn containing(employee_id: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(employee_id, date.year(), date.month())
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}-{:02}", self.employee_id, self.year, self.month)
    }
}

/// Emitted whenever an employee's attendance changes.
///
/// `affected_dates` holds the start dates of the intervals involved,
/// before and after the change.
///
/// # Example
///
/// ```
/// use payroll_engine::engine::{AttendanceChanged, ChangeKind, MonthKey};
/// use chrono::NaiveDate;
///
/// let event = AttendanceChanged {
///     employee_id: "emp_001".to_string(),
///     affected_dates: vec![
///         NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
///         NaiveDate::from_ymd_opt(2025, 3, 30).unwrap(),
///     ],
///     change_kind: ChangeKind::Edited,
/// };
///
/// assert_eq!(
///     event.affected_months(),
///     vec![MonthKey::new("emp_001", 2025, 3), MonthKey::new("emp_001", 2025, 4)]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceChanged {
    /// The employee whose attendance changed.
    pub employee_id: String,
    /// Dates whose calculations may have changed.
    pub affected_dates: Vec<NaiveDate>,
    /// The kind of change.
    pub change_kind: ChangeKind,
}

impl AttendanceChanged {
    /// Distinct months to recalculate, in chronological order.
    pub fn affected_months(&self) -> Vec<MonthKey> {
        self.affected_dates
            .iter()
            .map(|d| MonthKey::containing(self.employee_id.as_str(), *d))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
