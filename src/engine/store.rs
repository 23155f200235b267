//! Persistence contract for calculated records.

use std::collections::HashMap;
use std::sync::RwLock;

use super::event::MonthKey;
use crate::error::{EngineError, EngineResult};
use crate::models::{DailyBreakdown, MonthlySummary};

/// Where daily breakdowns and monthly summaries are kept.
///
/// Records are derived data: a recalculation replaces everything stored
/// for the month.
pub trait RecordStore: Send + Sync {
    /// Replaces the month's daily breakdowns. Records not in `records` are
    /// removed.
    fn replace_daily(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
        records: Vec<DailyBreakdown>,
    ) -> EngineResult<()>;

    /// The month's stored daily breakdowns.
    fn daily_for(&self, employee_id: &str, year: i32, month: u32)
    -> EngineResult<Vec<DailyBreakdown>>;

    /// Stores a monthly summary, replacing any previous one.
    fn put_monthly(&self, summary: MonthlySummary) -> EngineResult<()>;

    /// The stored monthly summary, if one has been calculated.
    fn monthly(&self, employee_id: &str, year: i32, month: u32)
    -> EngineResult<Option<MonthlySummary>>;

    /// Replaces the month's daily breakdowns and summary together.
    ///
    /// Implementations write both or neither; readers never see new
    /// daily records next to an old summary.
    fn replace_month(&self, summary: MonthlySummary, records: Vec<DailyBreakdown>)
    -> EngineResult<()>;
}

/// [`RecordStore`] held in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    daily: RwLock<HashMap<MonthKey, Vec<DailyBreakdown>>>,
    monthly: RwLock<HashMap<MonthKey, MonthlySummary>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryStore {
    fn replace_daily(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
        records: Vec<DailyBreakdown>,
    ) -> EngineResult<()> {
        let key = MonthKey::new(employee_id, year, month);
        let mut daily = self.daily.write().map_err(|_| poisoned())?;
        if records.is_empty() {
            daily.remove(&key);
        } else {
            daily.insert(key, records);
        }
        Ok(())
    }

    fn daily_for(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<Vec<DailyBreakdown>> {
        let key = MonthKey::new(employee_id, year, month);
        Ok(self
            .daily
            .read()
            .map_err(|_| poisoned())?
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }

    fn put_monthly(&self, summary: MonthlySummary) -> EngineResult<()> {
        let key = MonthKey::new(summary.employee_id.as_str(), summary.year, summary.month);
        self.monthly
            .write()
            .map_err(|_| poisoned())?
            .insert(key, summary);
        Ok(())
    }

    fn monthly(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<Option<MonthlySummary>> {
        let key = MonthKey::new(employee_id, year, month);
        Ok(self
            .monthly
            .read()
            .map_err(|_| poisoned())?
            .get(&key)
            .cloned())
    }

    fn replace_month(
        &self,
        summary: MonthlySummary,
        records: Vec<DailyBreakdown>,
    ) -> EngineResult<()> {
        let key = MonthKey::new(summary.employee_id.as_str(), summary.year, summary.month);
        // Both locks are taken before anything changes, daily first.
        let mut daily = self.daily.write().map_err(|_| poisoned())?;
        let mut monthly = self.monthly.write().map_err(|_| poisoned())?;

        if records.is_empty() {
            daily.remove(&key);
        } else {
            daily.insert(key.clone(), records);
        }
        monthly.insert(key, summary);
        Ok(())
    }
}

fn poisoned() -> EngineError {
    EngineError::CalculationError {
        message: "record store lock poisoned".to_string(),
    }
}
