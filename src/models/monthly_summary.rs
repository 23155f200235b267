//! Monthly summary models.
//!
//! This module contains the [`MonthlySummary`] type and the structures it
//! carries: pay lines per category, qualifying compensatory credits and
//! detected statutory violations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AuditWarning, CalculationType};
use crate::config::PayrollRules;

/// Represents the category of pay for a pay line.
///
/// # Example
///
/// ```
/// use payroll_engine::config::PayrollRules;
/// use payroll_engine::models::PayCategory;
/// use rust_decimal::Decimal;
///
/// let rules = PayrollRules::default();
/// assert_eq!(PayCategory::SabbathOvertime.multiplier(&rules), Decimal::new(175, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayCategory {
    /// Weekday hours within the daily norm.
    Regular,
    /// First weekday overtime tier.
    Overtime125,
    /// Weekday overtime beyond the first tier.
    Overtime150,
    /// Sabbath hours within the daily norm.
    SabbathRegular,
    /// Sabbath hours beyond the daily norm.
    SabbathOvertime,
    /// Official holiday hours.
    Holiday,
    /// Prorated monthly salary.
    MonthlyBase,
}

impl PayCategory {
    /// The hourly categories, in breakdown order.
    pub const HOURLY: [PayCategory; 6] = [
        PayCategory::Regular,
        PayCategory::Overtime125,
        PayCategory::Overtime150,
        PayCategory::SabbathRegular,
        PayCategory::SabbathOvertime,
        PayCategory::Holiday,
    ];

    /// The rate multiplier configured for this category.
    pub fn multiplier(&self, rules: &PayrollRules) -> Decimal {
        match self {
            PayCategory::Regular | PayCategory::MonthlyBase => Decimal::ONE,
            PayCategory::Overtime125 => rules.overtime.tier_1_multiplier,
            PayCategory::Overtime150 => rules.overtime.tier_2_multiplier,
            PayCategory::SabbathRegular => rules.premiums.sabbath_regular,
            PayCategory::SabbathOvertime => rules.premiums.sabbath_overtime,
            PayCategory::Holiday => rules.premiums.holiday,
        }
    }
}

/// A single line of the monthly breakdown.
///
/// For [`PayCategory::MonthlyBase`] `hours` is zero, `multiplier` is the
/// attendance ratio and `rate` is the base salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayLine {
    /// The category of pay.
    pub category: PayCategory,
    /// The number of hours in this category.
    pub hours: Decimal,
    /// The multiplier applied to the rate.
    pub multiplier: Decimal,
    /// The hourly rate (or base salary for the monthly base line).
    pub rate: Decimal,
    /// The amount, rounded to cents.
    pub amount: Decimal,
}

/// A shift that qualifies for a compensatory day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensatoryCredit {
    /// The date of the qualifying shift.
    pub date_earned: NaiveDate,
    /// Why the day was earned.
    pub reason: String,
    /// The interval that earned it; one credit per interval.
    pub source_interval_id: String,
    /// Sabbath and holiday hours worked in the shift.
    pub premium_hours: Decimal,
}

/// The statutory cap that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A Monday-start week above the regular cap plus overtime allowance.
    WeeklyHoursExceeded,
    /// A single date above the daily maximum.
    DailyHoursExceeded,
    /// Monthly overtime above the configured cap.
    MonthlyOvertimeExceeded,
}

/// A detected breach of a statutory cap. Never blocks calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalViolation {
    /// Which cap.
    pub kind: ViolationKind,
    /// First date of the offending period.
    pub period_start: NaiveDate,
    /// Last date of the offending period.
    pub period_end: NaiveDate,
    /// The cap.
    pub limit_hours: Decimal,
    /// Hours actually worked in the period.
    pub actual_hours: Decimal,
    /// `actual_hours - limit_hours`.
    pub excess_hours: Decimal,
    /// Human-readable description.
    pub message: String,
}

/// Monthly aggregate for one employee.
///
/// Keyed by (employee, year, month) and recomputed as a whole whenever any
/// of its daily breakdowns changes. Identical inputs give an identical
/// summary: it holds no timestamps or generated ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// The employee.
    pub employee_id: String,
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// Contract type the month was calculated under.
    pub calculation_type: CalculationType,
    /// Contract currency.
    pub currency: String,
    /// Hourly rate, or the hourly equivalent of a monthly salary.
    pub hourly_rate: Decimal,
    /// Number of shifts included.
    pub shift_count: u32,
    /// Total hours worked.
    pub total_hours: Decimal,
    /// Regular hours.
    pub regular_hours: Decimal,
    /// Regular pay. Informational for monthly contracts, where the base
    /// salary covers regular time.
    pub regular_pay: Decimal,
    /// First-tier overtime hours.
    pub overtime_1_hours: Decimal,
    /// First-tier overtime pay.
    pub overtime_1_pay: Decimal,
    /// Second-tier overtime hours.
    pub overtime_2_hours: Decimal,
    /// Second-tier overtime pay.
    pub overtime_2_pay: Decimal,
    /// Weekday overtime hours across both tiers.
    pub overtime_hours: Decimal,
    /// Weekday overtime pay across both tiers.
    pub overtime_pay: Decimal,
    /// Sabbath hours within the norm.
    pub sabbath_regular_hours: Decimal,
    /// Sabbath pay within the norm.
    pub sabbath_regular_pay: Decimal,
    /// Sabbath hours beyond the norm.
    pub sabbath_overtime_hours: Decimal,
    /// Sabbath pay beyond the norm.
    pub sabbath_overtime_pay: Decimal,
    /// All Sabbath hours.
    pub sabbath_hours: Decimal,
    /// Holiday hours.
    pub holiday_hours: Decimal,
    /// Holiday pay.
    pub holiday_pay: Decimal,
    /// Regular pay for hourly contracts, prorated salary for monthly ones.
    pub base_pay: Decimal,
    /// Everything above the regular tier.
    pub bonus_pay: Decimal,
    /// Gross pay for the month.
    pub total_gross_pay: Decimal,
    /// Distinct dates with worked time.
    pub worked_days: u32,
    /// Working days in the month under the configured work week.
    pub total_working_days: u32,
    /// Number of qualifying compensatory credits.
    pub compensatory_days_earned: u32,
    /// The qualifying credits, in date order.
    pub compensatory_credits: Vec<CompensatoryCredit>,
    /// Pay lines per category.
    pub breakdown: Vec<PayLine>,
    /// Non-fatal warnings.
    pub warnings: Vec<AuditWarning>,
    /// Detected statutory violations.
    pub legal_violations: Vec<LegalViolation>,
    /// Some classification came from the seasonal estimate.
    pub is_estimated: bool,
}

impl MonthlySummary {
    /// Returns the pay line for a category, if the month has one.
    pub fn line(&self, category: PayCategory) -> Option<&PayLine> {
        self.breakdown.iter().find(|l| l.category == category)
    }

    /// True if a warning with this code was raised.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}
