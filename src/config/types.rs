//! Configuration types for payroll calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Metadata about the payroll policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PolicyMetadata {
    /// Short policy code (e.g., "IL-HOURS-OT").
    pub code: String,
    /// The human-readable name of the policy.
    pub name: String,
    /// The version or effective date of the policy.
    pub version: String,
    /// The jurisdiction the policy applies to.
    pub jurisdiction: String,
}

/// Clock boundaries used to classify a shift as a night shift.
///
/// A shift is a night shift when it starts at or after `night_starts_at`
/// or at or before `night_ends_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ShiftWindow {
    /// Start-of-night boundary (inclusive).
    pub night_starts_at: NaiveTime,
    /// End-of-night boundary (inclusive).
    pub night_ends_at: NaiveTime,
}

/// Straight-time hour ceilings per shift type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DailyNorms {
    /// Norm for night shifts.
    pub night: Decimal,
    /// Norm for day shifts on any day but Friday.
    pub day: Decimal,
    /// Norm for day shifts starting on a Friday.
    pub friday: Decimal,
}

/// Weekday overtime tier configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct OvertimeTiers {
    /// Width of the first overtime tier in hours.
    pub tier_1_hours: Decimal,
    /// Multiplier for the first overtime tier.
    pub tier_1_multiplier: Decimal,
    /// Multiplier for hours beyond the first tier.
    pub tier_2_multiplier: Decimal,
}

/// Premium multipliers for Sabbath and official holidays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PremiumRates {
    /// Sabbath hours within the daily norm.
    pub sabbath_regular: Decimal,
    /// Sabbath hours beyond the daily norm.
    pub sabbath_overtime: Decimal,
    /// Flat multiplier for every hour on an official holiday.
    pub holiday: Decimal,
}

/// Statutory hour ceilings checked during monthly aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatutoryCaps {
    /// Regular hours allowed per week.
    pub weekly_regular_hours: Decimal,
    /// Overtime hours allowed per week on top of the regular hours.
    pub weekly_overtime_allowance: Decimal,
    /// Maximum hours worked on a single day.
    pub max_daily_hours: Decimal,
    /// Optional ceiling on overtime hours per month.
    #[serde(default)]
    pub monthly_overtime_cap: Option<Decimal>,
}

impl StatutoryCaps {
    /// The total weekly ceiling (regular cap plus overtime allowance).
    pub fn weekly_ceiling(&self) -> Decimal {
        self.weekly_regular_hours + self.weekly_overtime_allowance
    }
}

/// Compensatory day accrual policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CompensatoryPolicy {
    /// Minimum Sabbath/holiday hours in a single shift to earn one day.
    pub min_hours_per_shift: Decimal,
}

/// Settings for monthly-salary contracts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MonthlyContractPolicy {
    /// Divisor turning a monthly salary into an hourly-equivalent rate.
    pub hours_divisor: Decimal,
    /// Days of the week that count as working days.
    pub work_week: Vec<Weekday>,
}

/// The complete set of calculation rules.
///
/// `PayrollRules::default()` mirrors the shipped `config/israel/policy.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PayrollRules {
    /// Night shift detection boundaries.
    pub shift_window: ShiftWindow,
    /// Daily norms.
    pub norms: DailyNorms,
    /// Weekday overtime tiers.
    pub overtime: OvertimeTiers,
    /// Sabbath and holiday premiums.
    pub premiums: PremiumRates,
    /// Statutory caps.
    pub caps: StatutoryCaps,
    /// Compensatory accrual.
    pub compensatory: CompensatoryPolicy,
    /// Monthly contract settings.
    pub monthly: MonthlyContractPolicy,
}

impl Default for PayrollRules {
    fn default() -> Self {
        Self {
            shift_window: ShiftWindow {
                night_starts_at: NaiveTime::from_hms_opt(18, 0, 0).expect("Valid night start"),
                night_ends_at: NaiveTime::from_hms_opt(6, 0, 0).expect("Valid night end"),
            },
            norms: DailyNorms {
                night: Decimal::new(7, 0),
                day: Decimal::new(86, 1),
                friday: Decimal::new(76, 1),
            },
            overtime: OvertimeTiers {
                tier_1_hours: Decimal::new(2, 0),
                tier_1_multiplier: Decimal::new(125, 2),
                tier_2_multiplier: Decimal::new(150, 2),
            },
            premiums: PremiumRates {
                sabbath_regular: Decimal::new(150, 2),
                sabbath_overtime: Decimal::new(175, 2),
                holiday: Decimal::new(150, 2),
            },
            caps: StatutoryCaps {
                weekly_regular_hours: Decimal::new(42, 0),
                weekly_overtime_allowance: Decimal::new(16, 0),
                max_daily_hours: Decimal::new(12, 0),
                monthly_overtime_cap: None,
            },
            compensatory: CompensatoryPolicy {
                min_hours_per_shift: Decimal::new(4, 0),
            },
            monthly: MonthlyContractPolicy {
                hours_divisor: Decimal::new(182, 0),
                work_week: vec![
                    Weekday::Sun,
                    Weekday::Mon,
                    Weekday::Tue,
                    Weekday::Wed,
                    Weekday::Thu,
                ],
            },
        }
    }
}

impl PayrollRules {
    /// Checks that every value is usable by the calculators.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::PayrollRules;
    ///
    /// assert!(PayrollRules::default().validate().is_ok());
    /// ```
    pub fn validate(&self) -> EngineResult<()> {
        let positive = [
            ("norms.night", self.norms.night),
            ("norms.day", self.norms.day),
            ("norms.friday", self.norms.friday),
            ("overtime.tier_1_hours", self.overtime.tier_1_hours),
            ("overtime.tier_1_multiplier", self.overtime.tier_1_multiplier),
            ("overtime.tier_2_multiplier", self.overtime.tier_2_multiplier),
            ("premiums.sabbath_regular", self.premiums.sabbath_regular),
            ("premiums.sabbath_overtime", self.premiums.sabbath_overtime),
            ("premiums.holiday", self.premiums.holiday),
            ("caps.weekly_regular_hours", self.caps.weekly_regular_hours),
            ("caps.max_daily_hours", self.caps.max_daily_hours),
            ("monthly.hours_divisor", self.monthly.hours_divisor),
        ];

        for (field, value) in positive {
            if value <= Decimal::ZERO {
                return Err(EngineError::InvalidConfig {
                    field: field.to_string(),
                    message: format!("must be greater than zero, got {}", value),
                });
            }
        }

        if self.caps.weekly_overtime_allowance < Decimal::ZERO {
            return Err(EngineError::InvalidConfig {
                field: "caps.weekly_overtime_allowance".to_string(),
                message: "must not be negative".to_string(),
            });
        }

        if self.compensatory.min_hours_per_shift < Decimal::ZERO {
            return Err(EngineError::InvalidConfig {
                field: "compensatory.min_hours_per_shift".to_string(),
                message: "must not be negative".to_string(),
            });
        }

        if self.monthly.work_week.is_empty() {
            return Err(EngineError::InvalidConfig {
                field: "monthly.work_week".to_string(),
                message: "at least one working weekday is required".to_string(),
            });
        }

        Ok(())
    }
}

/// Policy file structure (`policy.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyFile {
    /// Policy metadata.
    pub policy: PolicyMetadata,
    /// Calculation rules.
    pub rules: PayrollRules,
}

/// Estimated Sabbath entry and exit times for one month of the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct SeasonalTimes {
    /// Month number (1-12).
    pub month: u32,
    /// Estimated Friday entry time.
    pub enters_at: NaiveTime,
    /// Estimated Saturday exit time.
    pub exits_at: NaiveTime,
}

/// Seasonal estimate file structure (`seasonal.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct SeasonalFile {
    /// One entry per month.
    pub months: Vec<SeasonalTimes>,
}

/// An official holiday from a holiday table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HolidayEntry {
    /// The calendar date of the holiday.
    pub date: NaiveDate,
    /// The name of the holiday.
    pub name: String,
    /// Precise start of the premium window, when known.
    #[serde(default)]
    pub starts_at: Option<NaiveDateTime>,
    /// Precise end of the premium window, when known.
    #[serde(default)]
    pub ends_at: Option<NaiveDateTime>,
}

/// Holiday file structure (`holidays/<year>.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct HolidayFile {
    /// The year covered by the file.
    pub year: i32,
    /// The holidays of that year.
    pub holidays: Vec<HolidayEntry>,
}

/// The complete payroll configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    metadata: PolicyMetadata,
    rules: PayrollRules,
    seasonal: Vec<SeasonalTimes>,
    holidays: Vec<HolidayEntry>,
}

impl PayrollConfig {
    /// Creates a new PayrollConfig from its component parts.
    pub fn new(
        metadata: PolicyMetadata,
        rules: PayrollRules,
        seasonal: Vec<SeasonalTimes>,
        holidays: Vec<HolidayEntry>,
    ) -> Self {
        let mut seasonal = seasonal;
        seasonal.sort_by_key(|s| s.month);
        let mut holidays = holidays;
        holidays.sort_by_key(|h| h.date);
        Self {
            metadata,
            rules,
            seasonal,
            holidays,
        }
    }

    /// Returns the policy metadata.
    pub fn policy(&self) -> &PolicyMetadata {
        &self.metadata
    }

    /// Returns the calculation rules.
    pub fn rules(&self) -> &PayrollRules {
        &self.rules
    }

    /// Returns the seasonal Sabbath estimates, ordered by month.
    pub fn seasonal(&self) -> &[SeasonalTimes] {
        &self.seasonal
    }

    /// Returns all holidays, ordered by date.
    pub fn holidays(&self) -> &[HolidayEntry] {
        &self.holidays
    }
}
