//! Calculation logic for the payroll engine.
//!
//! This module contains the pure calculation functions: shift type and
//! daily norm detection, splitting shifts against Sabbath and holiday
//! windows, tier allocation, the daily calculator, and the monthly
//! aggregator with its working-day and statutory cap checks.

mod daily;
mod monthly;
mod rounding;
mod segmentation;
mod shift_type;
mod tiering;
mod violations;
mod working_days;

pub use daily::calculate_daily;
pub use monthly::{WARNING_ATTENDANCE_RATIO_CAPPED, WARNING_CALENDAR_ESTIMATED, aggregate};
pub use rounding::{hours_to_minutes, minutes_to_hours, round_hours, round_money};
pub use segmentation::{WindowSegment, split_by_windows};
pub use shift_type::{classify_shift, daily_norm, shift_norm};
pub use tiering::{TierMinutes, allocate_tiers};
pub use violations::{
    daily_violations, detect_violations, monthly_overtime_violation, week_start, weekly_violations,
};
pub use working_days::{in_month, month_bounds, working_days_in_month};
