//! Statutory cap checks.
//!
//! Violations are reported as data on the monthly summary and never block
//! calculation. Shifts are attributed to their start date.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::config::StatutoryCaps;
use crate::models::{DailyBreakdown, LegalViolation, ViolationKind};

/// Returns the Monday starting the week that contains `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Runs every cap check over one month of breakdowns.
///
/// Results are ordered by kind (weekly, daily, monthly), then by period.
pub fn detect_violations(dailies: &[DailyBreakdown], caps: &StatutoryCaps) -> Vec<LegalViolation> {
    let mut violations = weekly_violations(dailies, caps);
    violations.extend(daily_violations(dailies, caps));
    violations.extend(monthly_overtime_violation(dailies, caps));
    violations
}

/// Monday-start weeks above the regular cap plus overtime allowance.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::weekly_violations;
/// use payroll_engine::config::PayrollRules;
///
/// let caps = PayrollRules::default().caps;
/// assert!(weekly_violations(&[], &caps).is_empty());
/// ```
pub fn weekly_violations(dailies: &[DailyBreakdown], caps: &StatutoryCaps) -> Vec<LegalViolation> {
    let mut weeks: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for daily in dailies {
        *weeks.entry(week_start(daily.date)).or_default() += daily.total_hours;
    }

    let limit = caps.weekly_ceiling();
    weeks
        .into_iter()
        .filter(|(_, hours)| *hours > limit)
        .map(|(monday, hours)| {
            let sunday = monday + Duration::days(6);
            LegalViolation {
                kind: ViolationKind::WeeklyHoursExceeded,
                period_start: monday,
                period_end: sunday,
                limit_hours: limit,
                actual_hours: hours,
                excess_hours: hours - limit,
                message: format!(
                    "Week of {} to {}: {} hours worked, limit is {} ({} regular + {} overtime)",
                    monday,
                    sunday,
                    hours.normalize(),
                    limit.normalize(),
                    caps.weekly_regular_hours.normalize(),
                    caps.weekly_overtime_allowance.normalize()
                ),
            }
        })
        .collect()
}

/// Dates whose total hours exceed the daily maximum.
pub fn daily_violations(dailies: &[DailyBreakdown], caps: &StatutoryCaps) -> Vec<LegalViolation> {
    let mut days: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for daily in dailies {
        *days.entry(daily.date).or_default() += daily.total_hours;
    }

    let limit = caps.max_daily_hours;
    days.into_iter()
        .filter(|(_, hours)| *hours > limit)
        .map(|(date, hours)| LegalViolation {
            kind: ViolationKind::DailyHoursExceeded,
            period_start: date,
            period_end: date,
            limit_hours: limit,
            actual_hours: hours,
            excess_hours: hours - limit,
            message: format!(
                "{}: {} hours worked, daily maximum is {}",
                date,
                hours.normalize(),
                limit.normalize()
            ),
        })
        .collect()
}

/// Weekday overtime for the month above the optional monthly cap.
pub fn monthly_overtime_violation(
    dailies: &[DailyBreakdown],
    caps: &StatutoryCaps,
) -> Option<LegalViolation> {
    let limit = caps.monthly_overtime_cap?;
    let first = dailies.iter().map(|d| d.date).min()?;
    let last = dailies.iter().map(|d| d.date).max()?;

    let overtime: Decimal = dailies.iter().map(DailyBreakdown::overtime_hours).sum();
    if overtime <= limit {
        return None;
    }

    Some(LegalViolation {
        kind: ViolationKind::MonthlyOvertimeExceeded,
        period_start: first,
        period_end: last,
        limit_hours: limit,
        actual_hours: overtime,
        excess_hours: overtime - limit,
        message: format!(
            "{} overtime hours this month, cap is {}",
            overtime.normalize(),
            limit.normalize()
        ),
    })
}
