//! Rounding and unit conversion shared by the calculators.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult};

const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// Rounds hours to 2 decimal places, midpoint away from zero.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::round_hours;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_hours(Decimal::new(12345, 3)), Decimal::new(1235, 2));
/// ```
pub fn round_hours(hours: Decimal) -> Decimal {
    hours.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds money to cents, midpoint away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts whole minutes to hours rounded to 2 decimal places.
pub fn minutes_to_hours(minutes: i64) -> Decimal {
    round_hours(Decimal::from(minutes) / MINUTES_PER_HOUR)
}

/// Converts configured hours (e.g. a norm of 8.6) to whole minutes.
pub fn hours_to_minutes(hours: Decimal) -> EngineResult<i64> {
    (hours * MINUTES_PER_HOUR)
        .round()
        .to_i64()
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("{} hours does not fit in a minute count", hours),
        })
}
