//! Per-shift calculation result.
//!
//! A [`DailyBreakdown`] is fully derived from one work interval, the
//! employee's active contract and the calendar classification. It is
//! replaced, never appended, whenever its interval changes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AuditStep, PayCategory};

/// Day or night shift, decided by the shift's start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    /// Starts between the night boundaries.
    Day,
    /// Starts at or after the night start, or at or before the night end.
    Night,
}

impl std::fmt::Display for ShiftType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShiftType::Day => write!(f, "day"),
            ShiftType::Night => write!(f, "night"),
        }
    }
}

/// The tiered result of calculating one shift.
///
/// Hours are rounded to 2 decimal places per category; pay is kept at
/// full precision so monthly totals round exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBreakdown {
    /// The employee the shift belongs to.
    pub employee_id: String,
    /// The work interval this breakdown was derived from.
    pub interval_id: String,
    /// The date the shift is attributed to (its start date).
    pub date: NaiveDate,
    /// Day or night.
    pub shift_type: ShiftType,
    /// The straight-time ceiling that applied.
    pub daily_norm: Decimal,
    /// The hourly rate tiers were multiplied against.
    pub hourly_rate: Decimal,
    /// Sum of every category's hours.
    pub total_hours: Decimal,
    /// Weekday hours within the norm.
    pub regular_hours: Decimal,
    /// Pay for regular hours.
    pub regular_pay: Decimal,
    /// Weekday hours in the first overtime tier.
    pub overtime_1_hours: Decimal,
    /// Pay for first-tier overtime.
    pub overtime_1_pay: Decimal,
    /// Weekday hours beyond the first overtime tier.
    pub overtime_2_hours: Decimal,
    /// Pay for second-tier overtime.
    pub overtime_2_pay: Decimal,
    /// Sabbath hours within the norm.
    pub sabbath_regular_hours: Decimal,
    /// Pay for Sabbath hours within the norm.
    pub sabbath_regular_pay: Decimal,
    /// Sabbath hours beyond the norm.
    pub sabbath_overtime_hours: Decimal,
    /// Pay for Sabbath hours beyond the norm.
    pub sabbath_overtime_pay: Decimal,
    /// Hours on an official holiday that is not a Sabbath.
    pub holiday_hours: Decimal,
    /// Pay for holiday hours.
    pub holiday_pay: Decimal,
    /// The shift touched an official holiday.
    pub is_holiday: bool,
    /// The shift touched the Sabbath.
    pub is_sabbath: bool,
    /// Name of the holiday or special Sabbath.
    pub holiday_name: Option<String>,
    /// The classification came from the seasonal estimate.
    pub is_estimated: bool,
    /// Sum of every category's pay.
    pub total_pay: Decimal,
    /// How each figure was reached.
    pub audit_steps: Vec<AuditStep>,
}

impl DailyBreakdown {
    /// An all-zero breakdown, used for open and zero-length intervals.
    pub fn empty(
        employee_id: impl Into<String>,
        interval_id: impl Into<String>,
        date: NaiveDate,
        shift_type: ShiftType,
        daily_norm: Decimal,
        hourly_rate: Decimal,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            interval_id: interval_id.into(),
            date,
            shift_type,
            daily_norm,
            hourly_rate,
            total_hours: Decimal::ZERO,
            regular_hours: Decimal::ZERO,
            regular_pay: Decimal::ZERO,
            overtime_1_hours: Decimal::ZERO,
            overtime_1_pay: Decimal::ZERO,
            overtime_2_hours: Decimal::ZERO,
            overtime_2_pay: Decimal::ZERO,
            sabbath_regular_hours: Decimal::ZERO,
            sabbath_regular_pay: Decimal::ZERO,
            sabbath_overtime_hours: Decimal::ZERO,
            sabbath_overtime_pay: Decimal::ZERO,
            holiday_hours: Decimal::ZERO,
            holiday_pay: Decimal::ZERO,
            is_holiday: false,
            is_sabbath: false,
            holiday_name: None,
            is_estimated: false,
            total_pay: Decimal::ZERO,
            audit_steps: Vec::new(),
        }
    }

    /// True when no time was worked.
    pub fn is_zero(&self) -> bool {
        self.total_hours.is_zero()
    }

    /// Weekday overtime hours across both tiers.
    pub fn overtime_hours(&self) -> Decimal {
        self.overtime_1_hours + self.overtime_2_hours
    }

    /// Hours that count towards a compensatory day.
    pub fn premium_hours(&self) -> Decimal {
        self.sabbath_regular_hours + self.sabbath_overtime_hours + self.holiday_hours
    }

    /// Hours booked to a pay category.
    pub fn hours_for(&self, category: PayCategory) -> Decimal {
        match category {
            PayCategory::Regular => self.regular_hours,
            PayCategory::Overtime125 => self.overtime_1_hours,
            PayCategory::Overtime150 => self.overtime_2_hours,
            PayCategory::SabbathRegular => self.sabbath_regular_hours,
            PayCategory::SabbathOvertime => self.sabbath_overtime_hours,
            PayCategory::Holiday => self.holiday_hours,
            PayCategory::MonthlyBase => Decimal::ZERO,
        }
    }

    /// Pay booked to a pay category.
    pub fn pay_for(&self, category: PayCategory) -> Decimal {
        match category {
            PayCategory::Regular => self.regular_pay,
            PayCategory::Overtime125 => self.overtime_1_pay,
            PayCategory::Overtime150 => self.overtime_2_pay,
            PayCategory::SabbathRegular => self.sabbath_regular_pay,
            PayCategory::SabbathOvertime => self.sabbath_overtime_pay,
            PayCategory::Holiday => self.holiday_pay,
            PayCategory::MonthlyBase => Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample() -> DailyBreakdown {
        let mut daily = DailyBreakdown::empty(
            "emp_001",
            "wl_1",
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            ShiftType::Day,
            dec("8.6"),
            dec("100"),
        );
        daily.sabbath_regular_hours = dec("8.6");
        daily.sabbath_overtime_hours = dec("1.4");
        daily.total_hours = dec("10");
        daily
    }

    #[test]
    fn test_empty_breakdown_is_zero() {
        let daily = DailyBreakdown::empty(
            "emp_001",
            "wl_1",
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            ShiftType::Night,
            dec("7"),
            dec("50"),
        );
        assert!(daily.is_zero());
        assert_eq!(daily.total_pay, Decimal::ZERO);
        assert!(daily.audit_steps.is_empty());
    }

    #[test]
    fn test_premium_hours_sum_sabbath_and_holiday() {
        let mut daily = sample();
        assert_eq!(daily.premium_hours(), dec("10"));
        daily.holiday_hours = dec("1");
        assert_eq!(daily.premium_hours(), dec("11"));
    }

    #[test]
    fn test_hours_for_category() {
        let daily = sample();
        assert_eq!(daily.hours_for(PayCategory::SabbathOvertime), dec("1.4"));
        assert_eq!(daily.hours_for(PayCategory::Regular), Decimal::ZERO);
        assert_eq!(daily.hours_for(PayCategory::MonthlyBase), Decimal::ZERO);
    }

    #[test]
    fn test_shift_type_display() {
        assert_eq!(ShiftType::Night.to_string(), "night");
        assert_eq!(ShiftType::Day.to_string(), "day");
    }

    #[test]
    fn test_breakdown_serializes_decimals_as_strings() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["sabbath_overtime_hours"], "1.4");
        assert_eq!(json["shift_type"], "day");
    }
}
