//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod audit;
mod classification;
mod compensatory;
mod contract;
mod daily_breakdown;
mod monthly_summary;
mod work_interval;

pub use audit::{AuditStep, AuditWarning, Severity};
pub use classification::{DayClassification, PremiumKind, PremiumWindow};
pub use compensatory::CompensatoryDayEntry;
pub use contract::{CalculationType, Contract, DEFAULT_CURRENCY};
pub use daily_breakdown::{DailyBreakdown, ShiftType};
pub use monthly_summary::{
    CompensatoryCredit, LegalViolation, MonthlySummary, PayCategory, PayLine, ViolationKind,
};
pub use work_interval::WorkInterval;
