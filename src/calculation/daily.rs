//! Daily calculator.
//!
//! Turns one work interval into a tiered [`DailyBreakdown`]. The function
//! is pure: the contract and calendar classifications are passed in.
//!
//! ## Rules
//!
//! - Night shifts (start at or after 18:00, or at or before 06:00) have a
//!   7 hour norm. Day shifts have 8.6 hours, or 7.6 starting on a Friday.
//! - Weekday: regular 1.0x up to the norm, 1.25x for the next 2 hours,
//!   1.5x beyond.
//! - Sabbath: 1.5x up to the norm, 1.75x beyond.
//! - Holiday that is not a Sabbath: flat 1.5x.
//!
//! All figures come from [`PayrollRules`]; the ones above are the defaults.

use rust_decimal::Decimal;
use serde_json::json;
use tracing::debug;

use super::{allocate_tiers, hours_to_minutes, minutes_to_hours, shift_norm, split_by_windows};
use crate::config::PayrollRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, Contract, DailyBreakdown, DayClassification, PayCategory, PremiumWindow,
    WorkInterval,
};

/// Calculates the tiered pay for one shift.
///
/// # Arguments
///
/// * `interval` - The work interval
/// * `contract` - The employee's active contract
/// * `classifications` - The calendar classifications governing the shift
///   (see [`crate::calendar::classify_interval`]). Each special day
///   contributes its premium window; Sabbath wins where windows overlap.
/// * `rules` - The payroll rules
///
/// # Returns
///
/// A [`DailyBreakdown`], all zero for open or zero-length intervals.
///
/// # Errors
///
/// - [`EngineError::InvalidInterval`] if the interval has no employee or
///   ends before it starts
/// - [`EngineError::CalculationError`] if the contract belongs to a
///   different employee
/// - [`EngineError::InvalidContract`] if the contract is unusable
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_daily;
/// use payroll_engine::config::PayrollRules;
/// use payroll_engine::models::{Contract, DayClassification, WorkInterval};
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
///
/// // Monday, 12 hours
/// let interval = WorkInterval::closed("wl_1", "emp_001", at("2025-03-10 07:00:00"), at("2025-03-10 19:00:00"));
/// let contract = Contract::hourly("emp_001", Decimal::new(100, 0));
/// let classifications = [DayClassification::ordinary(interval.date())];
///
/// let daily = calculate_daily(&interval, &contract, &classifications, &PayrollRules::default()).unwrap();
/// assert_eq!(daily.regular_hours, Decimal::new(86, 1));
/// assert_eq!(daily.overtime_1_hours, Decimal::new(2, 0));
/// assert_eq!(daily.overtime_2_hours, Decimal::new(14, 1));
/// assert_eq!(daily.total_pay, Decimal::new(1320, 0));
/// ```
pub fn calculate_daily(
    interval: &WorkInterval,
    contract: &Contract,
    classifications: &[DayClassification],
    rules: &PayrollRules,
) -> EngineResult<DailyBreakdown> {
    interval.validate()?;
    let employee_id = interval.employee()?;

    if contract.employee_id != employee_id {
        return Err(EngineError::CalculationError {
            message: format!(
                "contract {} belongs to '{}', not to '{}' (interval {})",
                contract.id, contract.employee_id, employee_id, interval.id
            ),
        });
    }

    let hourly_rate = contract.effective_hourly_rate(rules)?;
    let (shift_type, norm) = shift_norm(interval.start, &rules.shift_window, &rules.norms);

    let mut daily = DailyBreakdown::empty(
        employee_id,
        interval.id.as_str(),
        interval.date(),
        shift_type,
        norm,
        hourly_rate,
    );
    daily.is_estimated = classifications.iter().any(|c| c.is_estimated);

    let mut steps = Vec::new();
    push_step(
        &mut steps,
        "shift_type",
        "Shift Type Detection",
        json!({
            "start": interval.start.to_string(),
            "night_starts_at": rules.shift_window.night_starts_at.to_string(),
            "night_ends_at": rules.shift_window.night_ends_at.to_string(),
        }),
        json!({ "shift_type": shift_type }),
        format!("Shift starting {} is a {} shift", interval.start.format("%a %H:%M"), shift_type),
    );
    push_step(
        &mut steps,
        "daily_norm",
        "Daily Norm Selection",
        json!({
            "shift_type": shift_type,
            "day_of_week": interval.day_of_week().to_string(),
        }),
        json!({ "daily_norm": norm.to_string() }),
        format!("Straight-time ceiling for a {} shift on {} is {} hours", shift_type, interval.day_of_week(), norm.normalize()),
    );

    let Some(end) = interval.end else {
        debug!(interval_id = %interval.id, "Open interval, nothing to calculate");
        daily.audit_steps = steps;
        return Ok(daily);
    };

    let windows: Vec<(&DayClassification, PremiumWindow)> = classifications
        .iter()
        .filter_map(|c| c.premium_window().map(|w| (c, w)))
        .collect();
    let spans: Vec<PremiumWindow> = windows.iter().map(|(_, w)| *w).collect();
    let segments = split_by_windows(interval.start, end, &spans);
    let tiers = allocate_tiers(
        &segments,
        hours_to_minutes(norm)?,
        hours_to_minutes(rules.overtime.tier_1_hours)?,
    );

    for (classification, window) in &windows {
        let inside: i64 = segments
            .iter()
            .filter(|s| s.in_premium() && window.contains(s.start_time, s.end_time))
            .map(|s| s.minutes)
            .sum();

        if inside > 0 {
            daily.is_holiday |= classification.is_holiday;
            daily.is_sabbath |= classification.is_shabbat;
            if daily.holiday_name.is_none() {
                daily.holiday_name = classification.name.clone();
            }
        }

        push_step(
            &mut steps,
            "premium_window",
            "Sabbath/Holiday Window",
            json!({
                "date": classification.date.to_string(),
                "name": classification.name,
                "is_holiday": classification.is_holiday,
                "is_shabbat": classification.is_shabbat,
                "window_start": window.start.to_string(),
                "window_end": window.end.to_string(),
            }),
            json!({
                "premium_kind": window.kind,
                "premium_minutes": inside,
                "is_estimated": classification.is_estimated,
            }),
            format!(
                "{} of {} worked minutes fall inside the premium window {} to {}",
                inside,
                tiers.total(),
                window.start,
                window.end
            ),
        );
    }

    let minutes_by_category = [
        (PayCategory::Regular, tiers.regular),
        (PayCategory::Overtime125, tiers.overtime_1),
        (PayCategory::Overtime150, tiers.overtime_2),
        (PayCategory::SabbathRegular, tiers.sabbath_regular),
        (PayCategory::SabbathOvertime, tiers.sabbath_overtime),
        (PayCategory::Holiday, tiers.holiday),
    ];

    for (category, minutes) in minutes_by_category {
        let hours = minutes_to_hours(minutes);
        if hours.is_zero() {
            continue;
        }

        let multiplier = category.multiplier(rules);
        let pay = hours * hourly_rate * multiplier;
        book(&mut daily, category, hours, pay);

        let (rule_id, rule_name) = tier_rule(category);
        push_step(
            &mut steps,
            rule_id,
            rule_name,
            json!({
                "minutes": minutes,
                "hourly_rate": hourly_rate.to_string(),
                "multiplier": multiplier.to_string(),
            }),
            json!({
                "hours": hours.to_string(),
                "pay": pay.to_string(),
            }),
            format!(
                "{} hours at {}%: {} hours × {} × {} = {}",
                hours.normalize(),
                (multiplier * Decimal::ONE_HUNDRED).normalize(),
                hours.normalize(),
                hourly_rate.normalize(),
                multiplier.normalize(),
                pay.normalize()
            ),
        );
    }

    daily.audit_steps = steps;

    debug!(
        employee_id = %daily.employee_id,
        interval_id = %daily.interval_id,
        total_hours = %daily.total_hours,
        total_pay = %daily.total_pay,
        premium_windows = windows.len(),
        "Shift calculated"
    );

    Ok(daily)
}

fn book(daily: &mut DailyBreakdown, category: PayCategory, hours: Decimal, pay: Decimal) {
    let (hours_field, pay_field) = match category {
        PayCategory::Regular => (&mut daily.regular_hours, &mut daily.regular_pay),
        PayCategory::Overtime125 => (&mut daily.overtime_1_hours, &mut daily.overtime_1_pay),
        PayCategory::Overtime150 => (&mut daily.overtime_2_hours, &mut daily.overtime_2_pay),
        PayCategory::SabbathRegular => (&mut daily.sabbath_regular_hours, &mut daily.sabbath_regular_pay),
        PayCategory::SabbathOvertime => (&mut daily.sabbath_overtime_hours, &mut daily.sabbath_overtime_pay),
        PayCategory::Holiday => (&mut daily.holiday_hours, &mut daily.holiday_pay),
        PayCategory::MonthlyBase => return,
    };
    *hours_field = hours;
    *pay_field = pay;
    daily.total_hours += hours;
    daily.total_pay += pay;
}

fn tier_rule(category: PayCategory) -> (&'static str, &'static str) {
    match category {
        PayCategory::Regular => ("regular_hours", "Regular Hours"),
        PayCategory::Overtime125 => ("overtime_tier_1", "Weekday Overtime - First Tier"),
        PayCategory::Overtime150 => ("overtime_tier_2", "Weekday Overtime - Second Tier"),
        PayCategory::SabbathRegular => ("sabbath_regular", "Sabbath Hours Within Norm"),
        PayCategory::SabbathOvertime => ("sabbath_overtime", "Sabbath Hours Beyond Norm"),
        PayCategory::Holiday => ("holiday_hours", "Official Holiday Hours"),
        PayCategory::MonthlyBase => ("monthly_base", "Monthly Base Salary"),
    }
}

fn push_step(
    steps: &mut Vec<AuditStep>,
    rule_id: &str,
    rule_name: &str,
    input: serde_json::Value,
    output: serde_json::Value,
    reasoning: String,
) {
    steps.push(AuditStep {
        step_number: steps.len() as u32 + 1,
        rule_id: rule_id.to_string(),
        rule_name: rule_name.to_string(),
        input,
        output,
        reasoning,
    });
}
