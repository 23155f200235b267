//! Attendance source.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use tracing::debug;

use super::event::{AttendanceChanged, ChangeKind};
use crate::error::{EngineError, EngineResult};
use crate::models::WorkInterval;

/// Read access to recorded work intervals.
pub trait AttendanceSource: Send + Sync {
    /// Returns the employee's live intervals starting between `from` and
    /// `to` inclusive, ordered by start.
    ///
    /// Soft-deleted intervals are not returned. Open and malformed ones are.
    fn intervals(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<WorkInterval>>;
}

#[derive(Debug, Clone)]
struct Record {
    owner: String,
    interval: WorkInterval,
    deleted: bool,
}

/// [`AttendanceSource`] held in memory.
///
/// Every mutation returns the [`AttendanceChanged`] event a caller should
/// hand to the recalculation service.
///
/// # Example
///
/// ```
/// use payroll_engine::engine::{AttendanceSource, ChangeKind, InMemoryAttendance};
/// use payroll_engine::models::WorkInterval;
/// use chrono::{NaiveDate, NaiveDateTime};
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let attendance = InMemoryAttendance::new();
///
/// let event = attendance
///     .create(WorkInterval::closed("wl_1", "emp_001", at("2025-03-10 08:00:00"), at("2025-03-10 16:00:00")))
///     .unwrap();
/// assert_eq!(event.change_kind, ChangeKind::Created);
///
/// let march = attendance
///     .intervals(
///         "emp_001",
///         NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
///     )
///     .unwrap();
/// assert_eq!(march.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryAttendance {
    records: RwLock<HashMap<String, Record>>,
}

impl InMemoryAttendance {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, HashMap<String, Record>>> {
        self.records.read().map_err(|_| poisoned())
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, HashMap<String, Record>>> {
        self.records.write().map_err(|_| poisoned())
    }

    /// Records a new interval.
    ///
    /// The interval must name its employee. Inverted times are accepted
    /// here and reported when the month is calculated.
    pub fn create(&self, interval: WorkInterval) -> EngineResult<AttendanceChanged> {
        let owner = interval.employee()?.to_string();
        let mut records = self.write()?;

        if records.contains_key(&interval.id) {
            return Err(EngineError::InvalidInterval {
                interval_id: interval.id.clone(),
                message: "an interval with this id already exists".to_string(),
            });
        }

        let event = AttendanceChanged {
            employee_id: owner.clone(),
            affected_dates: vec![interval.date()],
            change_kind: ChangeKind::Created,
        };
        debug!(employee_id = %owner, interval_id = %interval.id, "Interval created");
        records.insert(
            interval.id.clone(),
            Record {
                owner,
                interval,
                deleted: false,
            },
        );
        Ok(event)
    }

    /// Replaces an interval's times, for example on check-out.
    ///
    /// The event names both the old and the new start date, so moving a
    /// shift across a month boundary recalculates both months.
    pub fn edit(&self, interval: WorkInterval) -> EngineResult<AttendanceChanged> {
        let mut records = self.write()?;
        let record = records
            .get_mut(&interval.id)
            .ok_or_else(|| unknown(&interval.id))?;

        if interval.employee_id.as_deref() != Some(record.owner.as_str()) {
            return Err(EngineError::InvalidInterval {
                interval_id: interval.id.clone(),
                message: format!("interval belongs to '{}'", record.owner),
            });
        }

        let mut affected_dates = vec![record.interval.date()];
        if interval.date() != record.interval.date() {
            affected_dates.push(interval.date());
        }
        record.interval = interval;

        Ok(AttendanceChanged {
            employee_id: record.owner.clone(),
            affected_dates,
            change_kind: ChangeKind::Edited,
        })
    }

    /// Hides an interval from calculation without removing it.
    pub fn soft_delete(&self, interval_id: &str) -> EngineResult<AttendanceChanged> {
        self.set_deleted(interval_id, true, ChangeKind::SoftDeleted)
    }

    /// Brings a soft-deleted interval back.
    pub fn restore(&self, interval_id: &str) -> EngineResult<AttendanceChanged> {
        self.set_deleted(interval_id, false, ChangeKind::Restored)
    }

    fn set_deleted(
        &self,
        interval_id: &str,
        deleted: bool,
        change_kind: ChangeKind,
    ) -> EngineResult<AttendanceChanged> {
        let mut records = self.write()?;
        let record = records.get_mut(interval_id).ok_or_else(|| unknown(interval_id))?;
        record.deleted = deleted;

        Ok(AttendanceChanged {
            employee_id: record.owner.clone(),
            affected_dates: vec![record.interval.date()],
            change_kind,
        })
    }
}

impl AttendanceSource for InMemoryAttendance {
    fn intervals(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<WorkInterval>> {
        let mut intervals: Vec<WorkInterval> = self
            .read()?
            .values()
            .filter(|r| !r.deleted && r.owner == employee_id)
            .filter(|r| (from..=to).contains(&r.interval.date()))
            .map(|r| r.interval.clone())
            .collect();
        intervals.sort_by(|a, b| (a.start, &a.id).cmp(&(b.start, &b.id)));
        Ok(intervals)
    }
}

fn unknown(interval_id: &str) -> EngineError {
    EngineError::InvalidInterval {
        interval_id: interval_id.to_string(),
        message: "no such interval".to_string(),
    }
}

fn poisoned() -> EngineError {
    EngineError::CalculationError {
        message: "attendance lock poisoned".to_string(),
    }
}
