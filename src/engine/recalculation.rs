//! Event-driven recalculation.

use std::sync::Arc;

use tracing::info;

use super::PayrollEngine;
use super::event::AttendanceChanged;
use crate::error::{EngineError, EngineResult};
use crate::models::MonthlySummary;

/// Recalculates the months touched by attendance changes.
///
/// Each month runs on tokio's blocking pool under the engine's lock for
/// that employee month, so it never overlaps another recalculation, a
/// batch run or a direct [`PayrollEngine::calculate_monthly`] of the same
/// month. Different months run in parallel. Recalculation is
/// write-through: when `handle` returns, the store and ledger already
/// hold the new results.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use payroll_engine::calendar::SeasonalEstimateCalendar;
/// use payroll_engine::config::{PayrollRules, SeasonalTimes};
/// use payroll_engine::contracts::ContractRegistry;
/// use payroll_engine::engine::{InMemoryAttendance, PayrollEngine, RecalculationService};
/// use payroll_engine::models::{Contract, WorkInterval};
/// use chrono::{NaiveDateTime, NaiveTime};
/// use rust_decimal::Decimal;
///
/// # #[tokio::main]
/// # async fn main() {
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let calendar = SeasonalEstimateCalendar::new(
///     (1..=12)
///         .map(|month| SeasonalTimes {
///             month,
///             enters_at: NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
///             exits_at: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
///         })
///         .collect(),
/// );
/// let contracts = Arc::new(ContractRegistry::new());
/// contracts.insert(Contract::hourly("emp_001", Decimal::new(40, 0))).unwrap();
/// let attendance = Arc::new(InMemoryAttendance::new());
///
/// let engine = PayrollEngine::new(PayrollRules::default(), Arc::new(calendar), contracts, attendance.clone());
/// let service = RecalculationService::new(Arc::new(engine));
///
/// let event = attendance
///     .create(WorkInterval::closed("wl_1", "emp_001", at("2025-03-10 08:00:00"), at("2025-03-10 16:00:00")))
///     .unwrap();
/// let summaries = service.handle(&event).await.unwrap();
/// assert_eq!(summaries[0].total_gross_pay, Decimal::new(320, 0));
/// # }
/// ```
pub struct RecalculationService {
    engine: Arc<PayrollEngine>,
}

impl RecalculationService {
    /// Creates a service over an engine.
    pub fn new(engine: Arc<PayrollEngine>) -> Self {
        Self { engine }
    }

    /// The engine doing the work.
    pub fn engine(&self) -> &PayrollEngine {
        &self.engine
    }

    /// Recalculates one employee month, waiting for any writer of the
    /// same month already in flight.
    pub async fn recalculate(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<MonthlySummary> {
        let engine = Arc::clone(&self.engine);
        let employee_id = employee_id.to_string();

        tokio::task::spawn_blocking(move || engine.calculate_monthly(&employee_id, year, month))
            .await
            .map_err(|err| EngineError::CalculationError {
                message: format!("recalculation task failed: {}", err),
            })?
    }

    /// Recalculates every month an attendance change touches.
    ///
    /// Summaries come back in chronological order. The first failing month
    /// stops the run; months already recalculated stay recalculated.
    pub async fn handle(&self, event: &AttendanceChanged) -> EngineResult<Vec<MonthlySummary>> {
        let months = event.affected_months();
        info!(
            employee_id = %event.employee_id,
            change_kind = ?event.change_kind,
            months = months.len(),
            "Attendance changed"
        );

        let mut summaries = Vec::with_capacity(months.len());
        for key in months {
            summaries.push(self.recalculate(&key.employee_id, key.year, key.month).await?);
        }
        Ok(summaries)
    }
}
