//! Per employee-month write locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::event::MonthKey;
use crate::error::{EngineError, EngineResult};

/// Lock table keyed by employee month.
///
/// Entries are created on first use and removed when the last lease on
/// them is dropped, so the table only holds months being worked on.
#[derive(Debug, Default)]
pub(crate) struct MonthLocks {
    table: Mutex<HashMap<MonthKey, Arc<Mutex<()>>>>,
}

impl MonthLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Takes a lease on the month's lock without acquiring it.
    pub(crate) fn lease(&self, key: MonthKey) -> EngineResult<MonthLease<'_>> {
        let mut table = self.table.lock().map_err(|_| EngineError::CalculationError {
            message: "month lock table poisoned".to_string(),
        })?;
        let lock = Arc::clone(table.entry(key.clone()).or_default());
        Ok(MonthLease {
            locks: self,
            key,
            lock,
        })
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.table.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// A claim on one month's lock; prunes the table entry on drop.
pub(crate) struct MonthLease<'a> {
    locks: &'a MonthLocks,
    key: MonthKey,
    lock: Arc<Mutex<()>>,
}

impl MonthLease<'_> {
    /// Blocks until no other writer holds the month.
    pub(crate) fn acquire(&self) -> MutexGuard<'_, ()> {
        // The lock guards no data, so a panic elsewhere cannot leave it inconsistent.
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for MonthLease<'_> {
    fn drop(&mut self) {
        let mut table = self
            .locks
            .table
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // One count held by the table, one by this lease.
        if table
            .get(&self.key)
            .is_some_and(|lock| Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2)
        {
            table.remove(&self.key);
        }
    }
}
