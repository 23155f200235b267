//! Compensatory day ledger entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A day off earned in lieu of a Sabbath or holiday shift.
///
/// Entries are appended from monthly aggregation and only ever move from
/// earned to redeemed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensatoryDayEntry {
    /// Unique identifier for the entry.
    pub id: Uuid,
    /// The employee who earned the day.
    pub employee_id: String,
    /// The date of the qualifying shift.
    pub date_earned: NaiveDate,
    /// Why the day was earned.
    pub reason: String,
    /// The interval that earned the day.
    pub source_interval_id: String,
    /// Whether the day has been taken.
    pub redeemed: bool,
    /// When the day was taken.
    #[serde(default)]
    pub redeemed_on: Option<NaiveDate>,
}

impl CompensatoryDayEntry {
    /// Creates an unredeemed entry with a fresh id.
    pub fn earned(
        employee_id: impl Into<String>,
        date_earned: NaiveDate,
        reason: impl Into<String>,
        source_interval_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            date_earned,
            reason: reason.into(),
            source_interval_id: source_interval_id.into(),
            redeemed: false,
            redeemed_on: None,
        }
    }
}
