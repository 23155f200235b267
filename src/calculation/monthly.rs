//! Monthly aggregator.
//!
//! Rolls one employee's daily breakdowns for a month into a
//! [`MonthlySummary`]: category totals, base and bonus pay, compensatory
//! credits, warnings and statutory violations.
//!
//! ## Contract Types
//!
//! - **Hourly**: gross pay is the sum of the daily totals.
//! - **Monthly**: the base salary is prorated by
//!   `min(1, worked_days / working_days)` and everything above the regular
//!   tier is paid as a bonus on top.
//!
//! Money is rounded to cents once, here, from exact daily sums.

use std::collections::BTreeSet;
use std::time::Instant;

use rust_decimal::Decimal;
use tracing::debug;

use super::{detect_violations, in_month, month_bounds, round_money, working_days_in_month};
use crate::config::PayrollRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditWarning, CalculationType, CompensatoryCredit, Contract, DailyBreakdown, MonthlySummary,
    PayCategory, PayLine, Severity,
};

/// Warning code for months that used estimated calendar data.
pub const WARNING_CALENDAR_ESTIMATED: &str = "calendar_estimated";

/// Warning code for monthly contracts with more worked days than working days.
pub const WARNING_ATTENDANCE_RATIO_CAPPED: &str = "attendance_ratio_capped";

/// Aggregates one month of daily breakdowns.
///
/// Zero-hour breakdowns are ignored. Inputs are sorted by date and interval
/// id first, so the result does not depend on input order.
///
/// # Errors
///
/// - [`EngineError::CalculationError`] if a breakdown belongs to another
///   employee, falls outside the month, or the contract belongs to another
///   employee
/// - [`EngineError::InvalidContract`] if the contract is unusable
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{aggregate, calculate_daily};
/// use payroll_engine::config::PayrollRules;
/// use payroll_engine::models::{Contract, DayClassification, WorkInterval};
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let rules = PayrollRules::default();
/// let contract = Contract::hourly("emp_001", Decimal::new(100, 0));
///
/// let interval = WorkInterval::closed("wl_1", "emp_001", at("2025-03-10 07:00:00"), at("2025-03-10 19:00:00"));
/// let daily = calculate_daily(&interval, &contract, &[DayClassification::ordinary(interval.date())], &rules).unwrap();
///
/// let summary = aggregate("emp_001", 2025, 3, &[daily], &contract, &rules).unwrap();
/// assert_eq!(summary.total_gross_pay, Decimal::new(1320, 0));
/// assert_eq!(summary.worked_days, 1);
/// ```
pub fn aggregate(
    employee_id: &str,
    year: i32,
    month: u32,
    dailies: &[DailyBreakdown],
    contract: &Contract,
    rules: &PayrollRules,
) -> EngineResult<MonthlySummary> {
    let start_time = Instant::now();
    month_bounds(year, month)?;

    if contract.employee_id != employee_id {
        return Err(EngineError::CalculationError {
            message: format!(
                "contract {} belongs to '{}', not to '{}'",
                contract.id, contract.employee_id, employee_id
            ),
        });
    }
    let hourly_rate = contract.effective_hourly_rate(rules)?;

    for daily in dailies {
        if daily.employee_id != employee_id {
            return Err(EngineError::CalculationError {
                message: format!(
                    "breakdown for interval {} belongs to '{}', not to '{}'",
                    daily.interval_id, daily.employee_id, employee_id
                ),
            });
        }
        if !in_month(daily.date, year, month) {
            return Err(EngineError::CalculationError {
                message: format!(
                    "breakdown for interval {} is dated {}, outside {}-{:02}",
                    daily.interval_id, daily.date, year, month
                ),
            });
        }
    }

    let mut included: Vec<DailyBreakdown> =
        dailies.iter().filter(|d| !d.is_zero()).cloned().collect();
    included.sort_by(|a, b| (a.date, &a.interval_id).cmp(&(b.date, &b.interval_id)));

    let hours = |category: PayCategory| -> Decimal {
        included.iter().map(|d| d.hours_for(category)).sum()
    };
    let exact_pay = |category: PayCategory| -> Decimal {
        included.iter().map(|d| d.pay_for(category)).sum()
    };

    let exact_total: Decimal = included.iter().map(|d| d.total_pay).sum();
    let exact_regular = exact_pay(PayCategory::Regular);
    let exact_premiums = exact_total - exact_regular;

    let worked_days = included
        .iter()
        .map(|d| d.date)
        .collect::<BTreeSet<_>>()
        .len() as u32;
    let total_working_days = working_days_in_month(year, month, &rules.monthly.work_week)?;

    let mut warnings = Vec::new();

    let (base_pay, bonus_pay, total_gross_pay) = match contract.calculation_type {
        CalculationType::Hourly => (
            round_money(exact_regular),
            round_money(exact_premiums),
            round_money(exact_total),
        ),
        CalculationType::Monthly => {
            if total_working_days == 0 {
                return Err(EngineError::CalculationError {
                    message: format!("{}-{:02} has no working days", year, month),
                });
            }
            if worked_days > total_working_days {
                warnings.push(AuditWarning::new(
                    WARNING_ATTENDANCE_RATIO_CAPPED,
                    format!(
                        "{} worked days exceed {} working days; base salary capped at 100%",
                        worked_days, total_working_days
                    ),
                    Severity::Low,
                ));
            }
            let base = round_money(prorated_salary(contract, worked_days, total_working_days));
            let bonus = round_money(exact_premiums);
            (base, bonus, base + bonus)
        }
    };

    let estimated = included.iter().filter(|d| d.is_estimated).count();
    if estimated > 0 {
        warnings.push(AuditWarning::new(
            WARNING_CALENDAR_ESTIMATED,
            format!(
                "{} shift(s) were classified from estimated Sabbath times; recalculate once the calendar is available",
                estimated
            ),
            Severity::Medium,
        ));
    }

    let breakdown = pay_lines(contract, rules, hourly_rate, base_pay, worked_days, total_working_days, &hours, &exact_pay);
    let compensatory_credits = compensatory_credits(&included, rules);
    let legal_violations = detect_violations(&included, &rules.caps);

    let summary = MonthlySummary {
        employee_id: employee_id.to_string(),
        year,
        month,
        calculation_type: contract.calculation_type,
        currency: contract.currency.clone(),
        hourly_rate,
        shift_count: included.len() as u32,
        total_hours: included.iter().map(|d| d.total_hours).sum(),
        regular_hours: hours(PayCategory::Regular),
        regular_pay: round_money(exact_regular),
        overtime_1_hours: hours(PayCategory::Overtime125),
        overtime_1_pay: round_money(exact_pay(PayCategory::Overtime125)),
        overtime_2_hours: hours(PayCategory::Overtime150),
        overtime_2_pay: round_money(exact_pay(PayCategory::Overtime150)),
        overtime_hours: hours(PayCategory::Overtime125) + hours(PayCategory::Overtime150),
        overtime_pay: round_money(
            exact_pay(PayCategory::Overtime125) + exact_pay(PayCategory::Overtime150),
        ),
        sabbath_regular_hours: hours(PayCategory::SabbathRegular),
        sabbath_regular_pay: round_money(exact_pay(PayCategory::SabbathRegular)),
        sabbath_overtime_hours: hours(PayCategory::SabbathOvertime),
        sabbath_overtime_pay: round_money(exact_pay(PayCategory::SabbathOvertime)),
        sabbath_hours: hours(PayCategory::SabbathRegular) + hours(PayCategory::SabbathOvertime),
        holiday_hours: hours(PayCategory::Holiday),
        holiday_pay: round_money(exact_pay(PayCategory::Holiday)),
        base_pay,
        bonus_pay,
        total_gross_pay,
        worked_days,
        total_working_days,
        compensatory_days_earned: compensatory_credits.len() as u32,
        compensatory_credits,
        breakdown,
        warnings,
        legal_violations,
        is_estimated: estimated > 0,
    };

    debug!(
        employee_id = %summary.employee_id,
        year,
        month,
        shifts_count = summary.shift_count,
        gross_pay = %summary.total_gross_pay,
        violations = summary.legal_violations.len(),
        duration_us = start_time.elapsed().as_micros(),
        "Monthly summary calculated"
    );

    Ok(summary)
}

/// `base_salary × min(1, worked_days / working_days)`, unrounded.
fn prorated_salary(contract: &Contract, worked_days: u32, working_days: u32) -> Decimal {
    let salary = contract.base_salary.unwrap_or_default();
    let ratio = attendance_ratio(worked_days, working_days);
    salary * ratio
}

fn attendance_ratio(worked_days: u32, working_days: u32) -> Decimal {
    if working_days == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(worked_days) / Decimal::from(working_days)).min(Decimal::ONE)
}

#[allow(clippy::too_many_arguments)]
fn pay_lines(
    contract: &Contract,
    rules: &PayrollRules,
    hourly_rate: Decimal,
    base_pay: Decimal,
    worked_days: u32,
    working_days: u32,
    hours: &dyn Fn(PayCategory) -> Decimal,
    exact_pay: &dyn Fn(PayCategory) -> Decimal,
) -> Vec<PayLine> {
    let mut lines = Vec::new();

    if contract.calculation_type == CalculationType::Monthly {
        lines.push(PayLine {
            category: PayCategory::MonthlyBase,
            hours: Decimal::ZERO,
            multiplier: attendance_ratio(worked_days, working_days).round_dp(4),
            rate: contract.base_salary.unwrap_or_default(),
            amount: base_pay,
        });
    }

    for category in PayCategory::HOURLY {
        if category == PayCategory::Regular && contract.calculation_type == CalculationType::Monthly {
            continue;
        }
        let category_hours = hours(category);
        if category_hours.is_zero() {
            continue;
        }
        lines.push(PayLine {
            category,
            hours: category_hours,
            multiplier: category.multiplier(rules),
            rate: hourly_rate,
            amount: round_money(exact_pay(category)),
        });
    }

    lines
}

/// One credit per Sabbath/holiday shift reaching the per-shift threshold.
fn compensatory_credits(dailies: &[DailyBreakdown], rules: &PayrollRules) -> Vec<CompensatoryCredit> {
    let threshold = rules.compensatory.min_hours_per_shift;

    dailies
        .iter()
        .filter(|d| {
            let premium = d.premium_hours();
            premium > Decimal::ZERO && premium >= threshold
        })
        .map(|d| CompensatoryCredit {
            date_earned: d.date,
            reason: match (&d.holiday_name, d.is_sabbath) {
                (Some(name), _) => format!("Worked on {}", name),
                (None, true) => "Worked on Sabbath".to_string(),
                (None, false) => "Worked on an official holiday".to_string(),
            },
            source_interval_id: d.interval_id.clone(),
            premium_hours: d.premium_hours(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::calculate_daily;
    use crate::models::{DayClassification, ShiftType, ViolationKind, WorkInterval};
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    /// A breakdown with the given hours per category at rate 110.
    fn breakdown(id: &str, date: &str, hours: &[(PayCategory, &str)]) -> DailyBreakdown {
        let rules = PayrollRules::default();
        let rate = dec("110");
        let mut daily = DailyBreakdown::empty(
            "emp_001",
            id,
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            ShiftType::Day,
            dec("8.6"),
            rate,
        );
        for (category, h) in hours {
            let h = dec(h);
            let pay = h * rate * category.multiplier(&rules);
            match category {
                PayCategory::Regular => (daily.regular_hours, daily.regular_pay) = (h, pay),
                PayCategory::Overtime125 => (daily.overtime_1_hours, daily.overtime_1_pay) = (h, pay),
                PayCategory::Overtime150 => (daily.overtime_2_hours, daily.overtime_2_pay) = (h, pay),
                PayCategory::SabbathRegular => {
                    daily.is_sabbath = true;
                    (daily.sabbath_regular_hours, daily.sabbath_regular_pay) = (h, pay)
                }
                PayCategory::SabbathOvertime => {
                    daily.is_sabbath = true;
                    (daily.sabbath_overtime_hours, daily.sabbath_overtime_pay) = (h, pay)
                }
                PayCategory::Holiday => {
                    daily.is_holiday = true;
                    (daily.holiday_hours, daily.holiday_pay) = (h, pay)
                }
                PayCategory::MonthlyBase => {}
            }
            daily.total_hours += h;
            daily.total_pay += pay;
        }
        daily
    }

    fn worked_example() -> Vec<DailyBreakdown> {
        vec![
            breakdown("wl_1", "2025-03-02", &[(PayCategory::Regular, "8.6"), (PayCategory::Overtime125, "2")]),
            breakdown("wl_2", "2025-03-03", &[(PayCategory::Regular, "8.6"), (PayCategory::Overtime125, "2")]),
            breakdown("wl_3", "2025-03-04", &[(PayCategory::Regular, "8.6"), (PayCategory::Overtime125, "2")]),
            breakdown("wl_4", "2025-03-05", &[(PayCategory::Regular, "8.6"), (PayCategory::Overtime125, "2")]),
            breakdown("wl_5", "2025-03-06", &[(PayCategory::Regular, "8.6"), (PayCategory::Overtime125, "2")]),
            breakdown("wl_6", "2025-03-09", &[(PayCategory::Regular, "8.6"), (PayCategory::Overtime125, "2")]),
            breakdown("wl_7", "2025-03-10", &[(PayCategory::Regular, "8.6"), (PayCategory::Overtime125, "0.37")]),
            breakdown("wl_8", "2025-03-11", &[(PayCategory::Regular, "2.8")]),
            breakdown(
                "wl_9",
                "2025-03-15",
                &[(PayCategory::SabbathRegular, "7"), (PayCategory::SabbathOvertime, "1.53")],
            ),
        ]
    }

    /// MA-001: the reference month
    #[test]
    fn test_ma_001_worked_example() {
        let contract = Contract::hourly("emp_001", dec("110"));
        let summary =
            aggregate("emp_001", 2025, 3, &worked_example(), &contract, &PayrollRules::default()).unwrap();

        assert_eq!(summary.regular_hours, dec("63"));
        assert_eq!(summary.overtime_1_hours, dec("12.37"));
        assert_eq!(summary.sabbath_regular_hours, dec("7"));
        assert_eq!(summary.sabbath_overtime_hours, dec("1.53"));

        assert_eq!(summary.regular_pay, dec("6930.00"));
        assert_eq!(summary.overtime_pay, dec("1700.88"));
        assert_eq!(summary.sabbath_regular_pay, dec("1155.00"));
        assert_eq!(summary.sabbath_overtime_pay, dec("294.53"));
        assert_eq!(summary.total_gross_pay, dec("10080.40"));
        assert_eq!(summary.total_hours, dec("83.9"));
    }

    /// MA-002: hourly total reconciles with the daily sum
    #[test]
    fn test_ma_002_reconciliation() {
        let contract = Contract::hourly("emp_001", dec("110"));
        let dailies = worked_example();
        let summary = aggregate("emp_001", 2025, 3, &dailies, &contract, &PayrollRules::default()).unwrap();

        let daily_sum: Decimal = dailies.iter().map(|d| d.total_pay).sum();
        assert_eq!(summary.total_gross_pay, round_money(daily_sum));
        assert_eq!(summary.shift_count, 9);
    }

    /// MA-003: same inputs in a different order give the same summary
    #[test]
    fn test_ma_003_idempotent_and_order_independent() {
        let contract = Contract::hourly("emp_001", dec("110"));
        let rules = PayrollRules::default();
        let dailies = worked_example();
        let mut reversed = dailies.clone();
        reversed.reverse();

        let first = aggregate("emp_001", 2025, 3, &dailies, &contract, &rules).unwrap();
        let second = aggregate("emp_001", 2025, 3, &reversed, &contract, &rules).unwrap();
        assert_eq!(first, second);
    }

    /// MA-004: monthly contract prorates the salary and adds premiums as bonus
    #[test]
    fn test_ma_004_monthly_contract() {
        let rules = PayrollRules::default();
        let contract = Contract::monthly("emp_001", dec("9100"));
        // 11 worked days of 22 working days in March 2025, plus a Sabbath shift
        let mut dailies: Vec<DailyBreakdown> = (2..=14)
            .filter_map(|day| {
                let date = NaiveDate::from_ymd_opt(2025, 3, day).unwrap();
                rules
                    .monthly
                    .work_week
                    .contains(&chrono::Datelike::weekday(&date))
                    .then(|| breakdown(&format!("wl_{}", day), &date.to_string(), &[(PayCategory::Regular, "8")]))
            })
            .collect();
        dailies.push(breakdown("wl_sab", "2025-03-15", &[(PayCategory::SabbathRegular, "5")]));
        let regular_days = dailies.len() as u32 - 1;

        let summary = aggregate("emp_001", 2025, 3, &dailies, &contract, &rules).unwrap();

        assert_eq!(summary.total_working_days, 22);
        assert_eq!(summary.worked_days, regular_days + 1);
        let expected_base = round_money(dec("9100") * Decimal::from(summary.worked_days) / dec("22"));
        assert_eq!(summary.base_pay, expected_base);
        // Sabbath bonus: 5h × 110 × 1.5 from the fixture rate
        assert_eq!(summary.bonus_pay, dec("825.00"));
        assert_eq!(summary.total_gross_pay, summary.base_pay + summary.bonus_pay);
        assert_eq!(summary.breakdown[0].category, PayCategory::MonthlyBase);
        assert!(summary.line(PayCategory::Regular).is_none());
    }

    /// MA-005: attendance ratio is capped at 1
    #[test]
    fn test_ma_005_attendance_ratio_capped() {
        let rules = PayrollRules::default();
        let contract = Contract::monthly("emp_001", dec("10000"));
        let dailies: Vec<DailyBreakdown> = (1..=28)
            .map(|day| breakdown(&format!("wl_{:02}", day), &format!("2025-02-{:02}", day), &[(PayCategory::Regular, "4")]))
            .collect();

        let summary = aggregate("emp_001", 2025, 2, &dailies, &contract, &rules).unwrap();
        assert_eq!(summary.worked_days, 28);
        assert_eq!(summary.base_pay, dec("10000.00"));
        assert!(summary.has_warning(WARNING_ATTENDANCE_RATIO_CAPPED));
    }

    /// MA-006: compensatory credit per qualifying shift, threshold inclusive
    #[test]
    fn test_ma_006_compensatory_credits() {
        let rules = PayrollRules::default();
        let contract = Contract::hourly("emp_001", dec("110"));
        let mut holiday = breakdown("wl_h", "2025-04-13", &[(PayCategory::Holiday, "4")]);
        holiday.holiday_name = Some("Passover".to_string());
        let dailies = vec![
            holiday,
            breakdown("wl_s", "2025-04-19", &[(PayCategory::SabbathRegular, "3.99")]),
            breakdown("wl_w", "2025-04-20", &[(PayCategory::Regular, "8")]),
        ];

        let summary = aggregate("emp_001", 2025, 4, &dailies, &contract, &rules).unwrap();
        assert_eq!(summary.compensatory_days_earned, 1);
        let credit = &summary.compensatory_credits[0];
        assert_eq!(credit.source_interval_id, "wl_h");
        assert_eq!(credit.reason, "Worked on Passover");
        assert_eq!(credit.premium_hours, dec("4"));
    }

    /// MA-007: weekly violation is reported but calculation completes
    #[test]
    fn test_ma_007_weekly_violation_does_not_block() {
        let contract = Contract::hourly("emp_001", dec("110"));
        let dailies: Vec<DailyBreakdown> = (10..=14)
            .map(|day| {
                breakdown(
                    &format!("wl_{}", day),
                    &format!("2025-03-{}", day),
                    &[(PayCategory::Regular, "8.6"), (PayCategory::Overtime125, "2"), (PayCategory::Overtime150, "1.4")],
                )
            })
            .collect();

        let summary = aggregate("emp_001", 2025, 3, &dailies, &contract, &PayrollRules::default()).unwrap();
        assert_eq!(summary.legal_violations.len(), 1);
        assert_eq!(summary.legal_violations[0].kind, ViolationKind::WeeklyHoursExceeded);
        assert_eq!(summary.legal_violations[0].excess_hours, dec("2"));
        assert!(summary.total_gross_pay > Decimal::ZERO);
    }

    #[test]
    fn test_breakdown_outside_month_is_rejected() {
        let contract = Contract::hourly("emp_001", dec("110"));
        let dailies = vec![breakdown("wl_1", "2025-04-01", &[(PayCategory::Regular, "8")])];
        let result = aggregate("emp_001", 2025, 3, &dailies, &contract, &PayrollRules::default());
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }

    #[test]
    fn test_breakdown_for_other_employee_is_rejected() {
        let contract = Contract::hourly("emp_002", dec("110"));
        let result = aggregate("emp_002", 2025, 3, &worked_example(), &contract, &PayrollRules::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_breakdowns_are_ignored() {
        let contract = Contract::hourly("emp_001", dec("110"));
        let mut dailies = worked_example();
        dailies.push(breakdown("wl_open", "2025-03-20", &[]));

        let summary = aggregate("emp_001", 2025, 3, &dailies, &contract, &PayrollRules::default()).unwrap();
        assert_eq!(summary.shift_count, 9);
        assert_eq!(summary.worked_days, 9);
    }

    #[test]
    fn test_estimated_breakdowns_raise_warning() {
        let contract = Contract::hourly("emp_001", dec("110"));
        let mut dailies = worked_example();
        dailies[8].is_estimated = true;

        let summary = aggregate("emp_001", 2025, 3, &dailies, &contract, &PayrollRules::default()).unwrap();
        assert!(summary.is_estimated);
        assert!(summary.has_warning(WARNING_CALENDAR_ESTIMATED));
    }

    #[test]
    fn test_empty_month() {
        let contract = Contract::hourly("emp_001", dec("110"));
        let summary = aggregate("emp_001", 2025, 3, &[], &contract, &PayrollRules::default()).unwrap();
        assert_eq!(summary.total_gross_pay, Decimal::ZERO);
        assert!(summary.breakdown.is_empty());
        assert!(summary.legal_violations.is_empty());
    }

    proptest! {
        #[test]
        fn prop_hourly_total_reconciles(shifts in prop::collection::vec((0u32..28, 1i64..=900), 0..25)) {
            let rules = PayrollRules::default();
            let contract = Contract::hourly("emp_001", dec("47.35"));
            let dailies: Vec<DailyBreakdown> = shifts
                .iter()
                .enumerate()
                .map(|(i, (day, minutes))| {
                    let start = make_datetime("2025-02-01", "07:00:00") + Duration::days(i64::from(*day));
                    let interval = WorkInterval::closed(
                        format!("wl_{}", i),
                        "emp_001",
                        start,
                        start + Duration::minutes(*minutes),
                    );
                    calculate_daily(&interval, &contract, &[DayClassification::ordinary(interval.date())], &rules).unwrap()
                })
                .collect();

            let summary = aggregate("emp_001", 2025, 2, &dailies, &contract, &rules).unwrap();
            let daily_sum: Decimal = dailies.iter().map(|d| d.total_pay).sum();
            prop_assert_eq!(summary.total_gross_pay, round_money(daily_sum));
            prop_assert_eq!(summary.total_hours, dailies.iter().map(|d| d.total_hours).sum::<Decimal>());
        }
    }
}
