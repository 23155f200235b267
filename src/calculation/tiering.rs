//! Tier allocation of worked minutes.
//!
//! ## Tier Structure
//!
//! Tier position is driven by the cumulative worked minutes of the whole
//! shift, so a shift running into a premium window keeps a single norm.
//! Each segment's own premium kind picks the column:
//!
//! | Position in shift          | Weekday  | Sabbath          | Holiday |
//! |----------------------------|----------|------------------|---------|
//! | within the norm            | regular  | Sabbath regular  | holiday |
//! | next `tier_1_hours`        | OT tier 1| Sabbath overtime | holiday |
//! | beyond                     | OT tier 2| Sabbath overtime | holiday |

use serde::{Deserialize, Serialize};

use super::WindowSegment;
use crate::models::PremiumKind;

/// Whole minutes booked to each pay tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierMinutes {
    /// Weekday minutes within the norm.
    pub regular: i64,
    /// Weekday minutes in the first overtime tier.
    pub overtime_1: i64,
    /// Weekday minutes beyond the first overtime tier.
    pub overtime_2: i64,
    /// Sabbath minutes within the norm.
    pub sabbath_regular: i64,
    /// Sabbath minutes beyond the norm.
    pub sabbath_overtime: i64,
    /// Holiday minutes.
    pub holiday: i64,
}

impl TierMinutes {
    /// All minutes across tiers.
    pub fn total(&self) -> i64 {
        self.regular
            + self.overtime_1
            + self.overtime_2
            + self.sabbath_regular
            + self.sabbath_overtime
            + self.holiday
    }

    /// Minutes inside the premium window.
    pub fn premium(&self) -> i64 {
        self.sabbath_regular + self.sabbath_overtime + self.holiday
    }
}

/// Books each segment's minutes to tiers.
///
/// # Arguments
///
/// * `segments` - Chronological segments of one shift
/// * `norm_minutes` - The daily norm in minutes
/// * `tier_1_minutes` - Width of the first overtime tier in minutes
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{allocate_tiers, split_by_windows};
/// use chrono::NaiveDateTime;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
///
/// // 12 hour weekday shift with an 8.6 hour norm
/// let segments = split_by_windows(at("2025-03-10 07:00:00"), at("2025-03-10 19:00:00"), &[]);
/// let tiers = allocate_tiers(&segments, 516, 120);
///
/// assert_eq!(tiers.regular, 516);
/// assert_eq!(tiers.overtime_1, 120);
/// assert_eq!(tiers.overtime_2, 84);
/// ```
pub fn allocate_tiers(
    segments: &[WindowSegment],
    norm_minutes: i64,
    tier_1_minutes: i64,
) -> TierMinutes {
    let norm_minutes = norm_minutes.max(0);
    let tier_1_end = norm_minutes + tier_1_minutes.max(0);

    let mut tiers = TierMinutes::default();
    let mut position = 0;

    for segment in segments {
        let from = position;
        let to = position + segment.minutes.max(0);
        position = to;

        let within = overlap(from, to, 0, norm_minutes);
        let first = overlap(from, to, norm_minutes, tier_1_end);
        let beyond = overlap(from, to, tier_1_end, i64::MAX);

        match segment.premium {
            Some(PremiumKind::Sabbath) => {
                tiers.sabbath_regular += within;
                tiers.sabbath_overtime += first + beyond;
            }
            Some(PremiumKind::Holiday) => {
                tiers.holiday += within + first + beyond;
            }
            None => {
                tiers.regular += within;
                tiers.overtime_1 += first;
                tiers.overtime_2 += beyond;
            }
        }
    }

    tiers
}

fn overlap(from: i64, to: i64, band_start: i64, band_end: i64) -> i64 {
    (to.min(band_end) - from.max(band_start)).max(0)
}
