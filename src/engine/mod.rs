//! Monthly payroll orchestration.
//!
//! [`PayrollEngine`] wires the collaborators together: it pulls intervals
//! from the [`AttendanceSource`], classifies them with the
//! [`CalendarProvider`], runs the daily calculator and the monthly
//! aggregator under the employee's active contract, then writes the
//! results to the [`RecordStore`] and the [`CompensatoryLedger`].
//!
//! Every write of a month, whether from [`PayrollEngine::calculate_monthly`],
//! [`PayrollEngine::run_batch`] or the [`RecalculationService`] consuming
//! [`AttendanceChanged`] events, holds that employee month's lock.

mod event;
mod locks;
mod recalculation;
mod source;
mod store;

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calculation::{aggregate, calculate_daily, month_bounds};
use crate::calendar::{CalendarProvider, classify_interval};
use crate::config::PayrollRules;
use crate::contracts::ContractRegistry;
use crate::error::{EngineError, EngineResult, ErrorClass};
use crate::ledger::{CompensatoryLedger, InMemoryLedger};
use crate::models::{AuditWarning, MonthlySummary, Severity};
use locks::MonthLocks;

pub use event::{AttendanceChanged, ChangeKind, MonthKey};
pub use recalculation::RecalculationService;
pub use source::{AttendanceSource, InMemoryAttendance};
pub use store::{InMemoryStore, RecordStore};

/// Warning code for a malformed interval left out of the month.
pub const WARNING_INTERVAL_SKIPPED: &str = "interval_skipped";

/// Calculates and records monthly payroll.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use payroll_engine::calendar::SeasonalEstimateCalendar;
/// use payroll_engine::config::{PayrollRules, SeasonalTimes};
/// use payroll_engine::contracts::ContractRegistry;
/// use payroll_engine::engine::{InMemoryAttendance, PayrollEngine};
/// use payroll_engine::models::{Contract, WorkInterval};
/// use chrono::{NaiveDateTime, NaiveTime};
/// use rust_decimal::Decimal;
///
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
///
/// let contracts = Arc::new(ContractRegistry::new());
/// contracts.insert(Contract::hourly("emp_001", Decimal::new(40, 0))).unwrap();
///
/// let attendance = Arc::new(InMemoryAttendance::new());
/// attendance
///     .create(WorkInterval::closed("wl_1", "emp_001", at("2025-03-10 08:00:00"), at("2025-03-10 16:00:00")))
///     .unwrap();
///
/// let engine = PayrollEngine::new(PayrollRules::default(), Arc::new(calendar), contracts, attendance);
/// let summary = engine.calculate_monthly("emp_001", 2025, 3).unwrap();
/// assert_eq!(summary.total_gross_pay, Decimal::new(320, 0));
/// ```
pub struct PayrollEngine {
    rules: PayrollRules,
    calendar: Arc<dyn CalendarProvider>,
    contracts: Arc<ContractRegistry>,
    attendance: Arc<dyn AttendanceSource>,
    store: Arc<dyn RecordStore>,
    ledger: Arc<dyn CompensatoryLedger>,
    locks: MonthLocks,
}

impl PayrollEngine {
    /// Creates an engine with an in-memory record store and ledger.
    pub fn new(
        rules: PayrollRules,
        calendar: Arc<dyn CalendarProvider>,
        contracts: Arc<ContractRegistry>,
        attendance: Arc<dyn AttendanceSource>,
    ) -> Self {
        Self {
            rules,
            calendar,
            contracts,
            attendance,
            store: Arc::new(InMemoryStore::new()),
            ledger: Arc::new(InMemoryLedger::new()),
            locks: MonthLocks::new(),
        }
    }

    /// Replaces the record store.
    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = store;
        self
    }

    /// Replaces the compensatory ledger.
    pub fn with_ledger(mut self, ledger: Arc<dyn CompensatoryLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    /// The calculation rules in force.
    pub fn rules(&self) -> &PayrollRules {
        &self.rules
    }

    /// The contract registry.
    pub fn contracts(&self) -> &ContractRegistry {
        &self.contracts
    }

    /// The record store.
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// The compensatory ledger.
    pub fn ledger(&self) -> &dyn CompensatoryLedger {
        self.ledger.as_ref()
    }

    /// Calculates one employee's month from scratch.
    ///
    /// Open intervals are left out. Malformed intervals are skipped with
    /// an `interval_skipped` warning. Every compensatory credit is posted
    /// to the ledger, which ignores repeats; then the daily records and
    /// the summary replace what was stored for the month in one write.
    /// A failure before that write leaves the stored month untouched.
    ///
    /// The call blocks while another writer holds the same employee month.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NoActiveContract`] when the employee has no active contract
    /// - [`EngineError::CalendarUnavailable`] when the calendar cannot answer
    /// - errors raised by the store or ledger
    pub fn calculate_monthly(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<MonthlySummary> {
        let lease = self.locks.lease(MonthKey::new(employee_id, year, month))?;
        let _guard = lease.acquire();
        self.calculate_locked(employee_id, year, month)
    }

    fn calculate_locked(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<MonthlySummary> {
        let start_time = Instant::now();
        let (first, last) = month_bounds(year, month)?;

        let contract = self.contracts.active_for(employee_id).inspect_err(|err| {
            warn!(employee_id = %employee_id, year, month, error = %err, "No active contract");
        })?;

        let intervals = self.attendance.intervals(employee_id, first, last)?;
        info!(
            employee_id = %employee_id,
            year,
            month,
            intervals_count = intervals.len(),
            "Starting monthly calculation"
        );

        let mut dailies = Vec::with_capacity(intervals.len());
        let mut skipped = Vec::new();

        for interval in &intervals {
            if !interval.is_closed() {
                debug!(interval_id = %interval.id, "Open interval excluded");
                continue;
            }
            if let Err(err) = interval.validate() {
                warn!(
                    employee_id = %employee_id,
                    interval_id = %interval.id,
                    error = %err,
                    "Interval skipped"
                );
                skipped.push(AuditWarning::new(
                    WARNING_INTERVAL_SKIPPED,
                    err.to_string(),
                    Severity::Medium,
                ));
                continue;
            }

            let classifications = classify_interval(self.calendar.as_ref(), interval)?;
            dailies.push(calculate_daily(interval, &contract, &classifications, &self.rules)?);
        }

        let mut summary = aggregate(employee_id, year, month, &dailies, &contract, &self.rules)?;
        summary.warnings.extend(skipped);

        for credit in &summary.compensatory_credits {
            self.ledger.credit(
                employee_id,
                credit.date_earned,
                &credit.reason,
                &credit.source_interval_id,
            )?;
        }
        self.store.replace_month(summary.clone(), dailies)?;

        info!(
            employee_id = %employee_id,
            year,
            month,
            gross_pay = %summary.total_gross_pay,
            violations = summary.legal_violations.len(),
            duration_us = start_time.elapsed().as_micros(),
            "Monthly calculation completed"
        );
        Ok(summary)
    }

    /// Calculates a month for many employees.
    ///
    /// A failing employee is recorded in [`BatchReport::failures`] and the
    /// run moves on.
    pub fn run_batch<I, S>(&self, employee_ids: I, year: i32, month: u32) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let start_time = Instant::now();
        let mut report = BatchReport {
            year,
            month,
            summaries: Vec::new(),
            failures: Vec::new(),
        };

        for employee_id in employee_ids {
            let employee_id = employee_id.as_ref();
            match self.calculate_monthly(employee_id, year, month) {
                Ok(summary) => report.summaries.push(summary),
                Err(err) => {
                    warn!(
                        employee_id = %employee_id,
                        year,
                        month,
                        error = %err,
                        "Employee failed in batch"
                    );
                    report.failures.push(BatchFailure::new(employee_id, &err));
                }
            }
        }

        info!(
            year,
            month,
            succeeded = report.summaries.len(),
            failed = report.failures.len(),
            duration_us = start_time.elapsed().as_micros(),
            "Batch completed"
        );
        report
    }
}

/// Outcome of [`PayrollEngine::run_batch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: u32,
    /// Summaries of the employees that succeeded, in input order.
    pub summaries: Vec<MonthlySummary>,
    /// Employees that failed.
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Returns true if no employee failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One employee's failure in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// The employee.
    pub employee_id: String,
    /// Error taxonomy class.
    pub class: ErrorClass,
    /// Error message.
    pub message: String,
}

impl BatchFailure {
    fn new(employee_id: &str, error: &EngineError) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            class: error.class(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::WARNING_CALENDAR_ESTIMATED;
    use crate::calendar::{FallbackCalendar, SeasonalEstimateCalendar, StaticCalendar};
    use crate::config::{HolidayEntry, PayrollConfig, PolicyMetadata, SeasonalTimes};
    use crate::ledger::CreditOutcome;
    use crate::models::{CompensatoryDayEntry, Contract, WorkInterval};
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicBool, Ordering};
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn seasonal() -> Vec<SeasonalTimes> {
        (1..=12)
            .map(|month| SeasonalTimes {
                month,
                enters_at: NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
                exits_at: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            })
            .collect()
    }

    fn static_calendar() -> StaticCalendar {
        let config = PayrollConfig::new(
            PolicyMetadata {
                code: "TEST".to_string(),
                name: "Test".to_string(),
                version: "1".to_string(),
                jurisdiction: "IL".to_string(),
            },
            PayrollRules::default(),
            seasonal(),
            vec![HolidayEntry {
                date: NaiveDate::from_ymd_opt(2025, 4, 13).unwrap(),
                name: "Passover".to_string(),
                starts_at: None,
                ends_at: None,
            }],
        );
        StaticCalendar::from_config(&config)
    }

    struct Fixture {
        engine: PayrollEngine,
        attendance: Arc<InMemoryAttendance>,
    }

    fn fixture_with(calendar: Arc<dyn CalendarProvider>) -> Fixture {
        let contracts = Arc::new(ContractRegistry::new());
        contracts
            .insert(Contract::hourly("emp_001", dec("40")))
            .unwrap();
        let attendance = Arc::new(InMemoryAttendance::new());
        let engine = PayrollEngine::new(
            PayrollRules::default(),
            calendar,
            contracts,
            attendance.clone(),
        );
        Fixture { engine, attendance }
    }

    /// Monday 8h, Tuesday 12h, Saturday 6h inside the Sabbath.
    fn march_fixture() -> Fixture {
        let fixture = fixture_with(Arc::new(static_calendar()));
        for (id, date, start, end) in [
            ("wl_1", "2025-03-10", "08:00:00", "16:00:00"),
            ("wl_2", "2025-03-11", "07:00:00", "19:00:00"),
            ("wl_3", "2025-03-15", "09:00:00", "15:00:00"),
        ] {
            fixture
                .attendance
                .create(WorkInterval::closed(
                    id,
                    "emp_001",
                    make_datetime(date, start),
                    make_datetime(date, end),
                ))
                .unwrap();
        }
        fixture
    }

    /// EN-001: intervals to summary, store and ledger
    #[test]
    fn test_en_001_end_to_end() {
        let fixture = march_fixture();
        let summary = fixture.engine.calculate_monthly("emp_001", 2025, 3).unwrap();

        // 320 + (344 + 100 + 84) + 360
        assert_eq!(summary.total_gross_pay, dec("1208.00"));
        assert_eq!(summary.base_pay, dec("664.00"));
        assert_eq!(summary.bonus_pay, dec("544.00"));
        assert_eq!(summary.shift_count, 3);
        assert_eq!(summary.sabbath_regular_hours, dec("6"));
        assert_eq!(summary.compensatory_days_earned, 1);
        assert!(!summary.is_estimated);

        let store = fixture.engine.store();
        assert_eq!(store.daily_for("emp_001", 2025, 3).unwrap().len(), 3);
        assert_eq!(store.monthly("emp_001", 2025, 3).unwrap(), Some(summary));

        let entries = fixture.engine.ledger().entries_for("emp_001").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source_interval_id, "wl_3");
        assert_eq!(entries[0].reason, "Worked on Sabbath");
    }

    /// EN-002: recalculating is idempotent
    #[test]
    fn test_en_002_recalculation_is_idempotent() {
        let fixture = march_fixture();
        let first = fixture.engine.calculate_monthly("emp_001", 2025, 3).unwrap();
        let second = fixture.engine.calculate_monthly("emp_001", 2025, 3).unwrap();

        assert_eq!(first, second);
        assert_eq!(fixture.engine.ledger().entries_for("emp_001").unwrap().len(), 1);
        assert_eq!(
            fixture.engine.store().daily_for("emp_001", 2025, 3).unwrap().len(),
            3
        );
    }

    /// EN-003: open intervals are excluded
    #[test]
    fn test_en_003_open_interval_excluded() {
        let fixture = march_fixture();
        fixture
            .attendance
            .create(WorkInterval::open(
                "wl_open",
                "emp_001",
                make_datetime("2025-03-12", "08:00:00"),
            ))
            .unwrap();

        let summary = fixture.engine.calculate_monthly("emp_001", 2025, 3).unwrap();
        assert_eq!(summary.shift_count, 3);
        assert_eq!(summary.total_gross_pay, dec("1208.00"));
    }

    /// EN-004: malformed intervals are skipped with a warning
    #[test]
    fn test_en_004_inverted_interval_skipped() {
        let fixture = march_fixture();
        fixture
            .attendance
            .create(WorkInterval::closed(
                "wl_bad",
                "emp_001",
                make_datetime("2025-03-12", "16:00:00"),
                make_datetime("2025-03-12", "08:00:00"),
            ))
            .unwrap();

        let summary = fixture.engine.calculate_monthly("emp_001", 2025, 3).unwrap();
        assert!(summary.has_warning(WARNING_INTERVAL_SKIPPED));
        assert_eq!(summary.total_gross_pay, dec("1208.00"));
        let warning = summary
            .warnings
            .iter()
            .find(|w| w.code == WARNING_INTERVAL_SKIPPED)
            .unwrap();
        assert!(warning.message.contains("wl_bad"));
    }

    /// EN-005: no active contract names the employee
    #[test]
    fn test_en_005_missing_contract() {
        let fixture = march_fixture();
        match fixture.engine.calculate_monthly("emp_404", 2025, 3) {
            Err(EngineError::NoActiveContract { employee_id }) => assert_eq!(employee_id, "emp_404"),
            other => panic!("Expected NoActiveContract, got {:?}", other),
        }
    }

    /// EN-006: deleted intervals disappear from stored records, earned days stay
    #[test]
    fn test_en_006_soft_delete_recalculation() {
        let fixture = march_fixture();
        fixture.engine.calculate_monthly("emp_001", 2025, 3).unwrap();

        fixture.attendance.soft_delete("wl_3").unwrap();
        let summary = fixture.engine.calculate_monthly("emp_001", 2025, 3).unwrap();

        assert_eq!(summary.total_gross_pay, dec("848.00"));
        assert_eq!(summary.compensatory_days_earned, 0);
        let stored = fixture.engine.store().daily_for("emp_001", 2025, 3).unwrap();
        assert!(stored.iter().all(|d| d.interval_id != "wl_3"));
        assert_eq!(fixture.engine.ledger().entries_for("emp_001").unwrap().len(), 1);
    }

    /// EN-007: one failing employee does not abort the batch
    #[test]
    fn test_en_007_batch_isolates_failures() {
        let fixture = march_fixture();
        let report = fixture
            .engine
            .run_batch(["emp_001", "emp_002"], 2025, 3);

        assert!(!report.is_clean());
        assert_eq!(report.summaries.len(), 1);
        assert_eq!(report.summaries[0].employee_id, "emp_001");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].employee_id, "emp_002");
        assert_eq!(report.failures[0].class, ErrorClass::Configuration);
    }

    /// EN-008: an uncovered year fails without a fallback
    #[test]
    fn test_en_008_calendar_unavailable() {
        let fixture = fixture_with(Arc::new(static_calendar()));
        fixture
            .attendance
            .create(WorkInterval::closed(
                "wl_1",
                "emp_001",
                make_datetime("2031-03-10", "08:00:00"),
                make_datetime("2031-03-10", "16:00:00"),
            ))
            .unwrap();

        let result = fixture.engine.calculate_monthly("emp_001", 2031, 3);
        assert!(matches!(result, Err(EngineError::CalendarUnavailable { .. })));

        let report = fixture.engine.run_batch(["emp_001"], 2031, 3);
        assert_eq!(report.failures[0].class, ErrorClass::CalendarUnavailable);
    }

    /// EN-009: the fallback answers with estimated times
    #[test]
    fn test_en_009_calendar_fallback() {
        let calendar = FallbackCalendar::new(
            static_calendar(),
            SeasonalEstimateCalendar::new(seasonal()),
        );
        let fixture = fixture_with(Arc::new(calendar));
        fixture
            .attendance
            .create(WorkInterval::closed(
                "wl_1",
                "emp_001",
                make_datetime("2031-03-10", "08:00:00"),
                make_datetime("2031-03-10", "16:00:00"),
            ))
            .unwrap();

        let summary = fixture.engine.calculate_monthly("emp_001", 2031, 3).unwrap();
        assert!(summary.is_estimated);
        assert!(summary.has_warning(WARNING_CALENDAR_ESTIMATED));
        assert_eq!(summary.total_gross_pay, dec("320.00"));
    }

    /// Ledger that fails every credit while `failing` is set.
    struct FlakyLedger {
        inner: InMemoryLedger,
        failing: AtomicBool,
    }

    impl CompensatoryLedger for FlakyLedger {
        fn credit(
            &self,
            employee_id: &str,
            date_earned: NaiveDate,
            reason: &str,
            source_interval_id: &str,
        ) -> EngineResult<CreditOutcome> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(EngineError::CalculationError {
                    message: "ledger offline".to_string(),
                });
            }
            self.inner.credit(employee_id, date_earned, reason, source_interval_id)
        }

        fn redeem(&self, entry_id: Uuid, on: NaiveDate) -> EngineResult<CompensatoryDayEntry> {
            self.inner.redeem(entry_id, on)
        }

        fn get(&self, entry_id: Uuid) -> EngineResult<CompensatoryDayEntry> {
            self.inner.get(entry_id)
        }

        fn entries_for(&self, employee_id: &str) -> EngineResult<Vec<CompensatoryDayEntry>> {
            self.inner.entries_for(employee_id)
        }
    }

    /// EN-010: a ledger failure leaves the stored month as it was
    #[test]
    fn test_en_010_ledger_failure_keeps_stored_month() {
        let ledger = Arc::new(FlakyLedger {
            inner: InMemoryLedger::new(),
            failing: AtomicBool::new(false),
        });
        let Fixture { engine, attendance } = fixture_with(Arc::new(static_calendar()));
        let engine = engine.with_ledger(ledger.clone());

        attendance
            .create(WorkInterval::closed(
                "wl_1",
                "emp_001",
                make_datetime("2025-03-10", "08:00:00"),
                make_datetime("2025-03-10", "16:00:00"),
            ))
            .unwrap();
        let before = engine.calculate_monthly("emp_001", 2025, 3).unwrap();

        attendance
            .create(WorkInterval::closed(
                "wl_sat",
                "emp_001",
                make_datetime("2025-03-15", "09:00:00"),
                make_datetime("2025-03-15", "15:00:00"),
            ))
            .unwrap();
        ledger.failing.store(true, Ordering::SeqCst);
        let result = engine.calculate_monthly("emp_001", 2025, 3);
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));

        assert_eq!(engine.store().daily_for("emp_001", 2025, 3).unwrap().len(), 1);
        assert_eq!(engine.store().monthly("emp_001", 2025, 3).unwrap(), Some(before));

        ledger.failing.store(false, Ordering::SeqCst);
        let after = engine.calculate_monthly("emp_001", 2025, 3).unwrap();
        assert_eq!(after.shift_count, 2);
        assert_eq!(engine.store().daily_for("emp_001", 2025, 3).unwrap().len(), 2);
        assert_eq!(engine.ledger().entries_for("emp_001").unwrap().len(), 1);
    }

    /// EN-011: concurrent direct calls on one month leave no lock behind
    #[test]
    fn test_en_011_direct_calls_release_month_lock() {
        let fixture = march_fixture();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| fixture.engine.calculate_monthly("emp_001", 2025, 3).unwrap());
            }
        });
        assert_eq!(fixture.engine.locks.len(), 0);
        assert_eq!(fixture.engine.ledger().entries_for("emp_001").unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_month() {
        let fixture = march_fixture();
        assert!(fixture.engine.calculate_monthly("emp_001", 2025, 13).is_err());
    }
}
