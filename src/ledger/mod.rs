//! Compensatory day ledger.
//!
//! Append-only record of days off earned by working a Sabbath or holiday.
//! Crediting is idempotent per qualifying shift, so recalculating a month
//! never duplicates entries. Entries only move from earned to redeemed.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::CompensatoryDayEntry;

/// Result of [`CompensatoryLedger::credit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreditOutcome {
    /// A new entry was appended.
    Created(CompensatoryDayEntry),
    /// The shift had already earned an entry; the existing one is returned.
    AlreadyCredited(CompensatoryDayEntry),
}

impl CreditOutcome {
    /// The entry, new or existing.
    pub fn entry(&self) -> &CompensatoryDayEntry {
        match self {
            CreditOutcome::Created(entry) | CreditOutcome::AlreadyCredited(entry) => entry,
        }
    }

    /// Returns true if a new entry was appended.
    pub fn is_created(&self) -> bool {
        matches!(self, CreditOutcome::Created(_))
    }
}

/// Storage contract for compensatory day entries.
pub trait CompensatoryLedger: Send + Sync {
    /// Credits a day for a qualifying shift.
    ///
    /// A second credit for the same `(employee_id, source_interval_id)`
    /// returns [`CreditOutcome::AlreadyCredited`].
    fn credit(
        &self,
        employee_id: &str,
        date_earned: NaiveDate,
        reason: &str,
        source_interval_id: &str,
    ) -> EngineResult<CreditOutcome>;

    /// Marks an entry as taken on `on`.
    ///
    /// # Errors
    ///
    /// [`EngineError::LedgerEntryNotFound`] for unknown ids and
    /// [`EngineError::AlreadyRedeemed`] when the entry was already taken.
    fn redeem(&self, entry_id: Uuid, on: NaiveDate) -> EngineResult<CompensatoryDayEntry>;

    /// Returns an entry by id.
    fn get(&self, entry_id: Uuid) -> EngineResult<CompensatoryDayEntry>;

    /// All entries of an employee ordered by date earned.
    fn entries_for(&self, employee_id: &str) -> EngineResult<Vec<CompensatoryDayEntry>>;

    /// Number of days the employee has earned and not yet taken.
    fn unredeemed_count(&self, employee_id: &str) -> EngineResult<usize> {
        Ok(self
            .entries_for(employee_id)?
            .iter()
            .filter(|e| !e.redeemed)
            .count())
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    entries: BTreeMap<Uuid, CompensatoryDayEntry>,
    by_source: BTreeMap<(String, String), Uuid>,
}

/// [`CompensatoryLedger`] held in memory.
///
/// # Example
///
/// ```
/// use payroll_engine::ledger::{CompensatoryLedger, InMemoryLedger};
/// use chrono::NaiveDate;
///
/// let ledger = InMemoryLedger::new();
/// let saturday = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
///
/// let first = ledger.credit("emp_001", saturday, "Worked on Sabbath", "wl_9").unwrap();
/// let again = ledger.credit("emp_001", saturday, "Worked on Sabbath", "wl_9").unwrap();
///
/// assert!(first.is_created());
/// assert!(!again.is_created());
/// assert_eq!(ledger.unredeemed_count("emp_001").unwrap(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, LedgerState>> {
        self.state.lock().map_err(|_| EngineError::CalculationError {
            message: "compensatory ledger lock poisoned".to_string(),
        })
    }
}

impl CompensatoryLedger for InMemoryLedger {
    fn credit(
        &self,
        employee_id: &str,
        date_earned: NaiveDate,
        reason: &str,
        source_interval_id: &str,
    ) -> EngineResult<CreditOutcome> {
        let mut state = self.lock()?;
        let key = (employee_id.to_string(), source_interval_id.to_string());

        if let Some(existing) = state.by_source.get(&key).and_then(|id| state.entries.get(id)) {
            debug!(
                employee_id = %employee_id,
                interval_id = %source_interval_id,
                "Compensatory day already credited"
            );
            return Ok(CreditOutcome::AlreadyCredited(existing.clone()));
        }

        let entry = CompensatoryDayEntry::earned(employee_id, date_earned, reason, source_interval_id);
        state.by_source.insert(key, entry.id);
        state.entries.insert(entry.id, entry.clone());

        info!(
            employee_id = %employee_id,
            interval_id = %source_interval_id,
            date_earned = %date_earned,
            "Compensatory day credited"
        );
        Ok(CreditOutcome::Created(entry))
    }

    fn redeem(&self, entry_id: Uuid, on: NaiveDate) -> EngineResult<CompensatoryDayEntry> {
        let mut state = self.lock()?;
        let entry = state
            .entries
            .get_mut(&entry_id)
            .ok_or(EngineError::LedgerEntryNotFound { entry_id })?;

        if entry.redeemed {
            return Err(EngineError::AlreadyRedeemed { entry_id });
        }
        entry.redeemed = true;
        entry.redeemed_on = Some(on);

        info!(employee_id = %entry.employee_id, entry_id = %entry_id, "Compensatory day redeemed");
        Ok(entry.clone())
    }

    fn get(&self, entry_id: Uuid) -> EngineResult<CompensatoryDayEntry> {
        self.lock()?
            .entries
            .get(&entry_id)
            .cloned()
            .ok_or(EngineError::LedgerEntryNotFound { entry_id })
    }

    fn entries_for(&self, employee_id: &str) -> EngineResult<Vec<CompensatoryDayEntry>> {
        let mut entries: Vec<CompensatoryDayEntry> = self
            .lock()?
            .entries
            .values()
            .filter(|e| e.employee_id == employee_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            a.date_earned
                .cmp(&b.date_earned)
                .then_with(|| a.source_interval_id.cmp(&b.source_interval_id))
        });
        Ok(entries)
    }
}
