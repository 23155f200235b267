//! Splitting a shift against premium windows.
//!
//! A shift that crosses the edge of a Sabbath or holiday is split into
//! chronologically ordered segments. Each segment lies entirely inside or
//! entirely outside every window, so the right rules apply minute by
//! minute, even when a shift runs from one special day into the next.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{PremiumKind, PremiumWindow};

/// A part of a shift governed by a single set of rules.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::WindowSegment;
/// use payroll_engine::models::PremiumKind;
/// use chrono::NaiveDateTime;
///
/// let segment = WindowSegment {
///     start_time: NaiveDateTime::parse_from_str("2025-03-14 17:30:00", "%Y-%m-%d %H:%M:%S").unwrap(),
///     end_time: NaiveDateTime::parse_from_str("2025-03-14 22:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
///     premium: Some(PremiumKind::Sabbath),
///     minutes: 270,
/// };
/// assert!(segment.in_premium());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSegment {
    /// The start time of this segment.
    pub start_time: NaiveDateTime,
    /// The end time of this segment.
    pub end_time: NaiveDateTime,
    /// Rules governing the segment, `None` for ordinary time.
    pub premium: Option<PremiumKind>,
    /// Whole worked minutes credited to this segment.
    pub minutes: i64,
}

impl WindowSegment {
    /// True when the segment lies inside a premium window.
    pub fn in_premium(&self) -> bool {
        self.premium.is_some()
    }
}

/// Splits `[start, end)` at the edges of every window.
///
/// Where windows overlap, Sabbath rules win over holiday rules. Minutes
/// are counted from the shift start, so the segments always sum to the
/// shift's whole minutes even when the edges carry seconds. Segments with
/// no whole minute are dropped.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::split_by_windows;
/// use payroll_engine::models::{PremiumKind, PremiumWindow};
/// use chrono::NaiveDateTime;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
///
/// // Friday shift running into a Sabbath that starts at 17:30
/// let sabbath = PremiumWindow {
///     start: at("2025-03-14 17:30:00"),
///     end: at("2025-03-15 18:30:00"),
///     kind: PremiumKind::Sabbath,
/// };
/// let segments = split_by_windows(at("2025-03-14 14:00:00"), at("2025-03-14 22:00:00"), &[sabbath]);
///
/// assert_eq!(segments.len(), 2);
/// assert_eq!(segments[0].premium, None);
/// assert_eq!(segments[0].minutes, 210);
/// assert_eq!(segments[1].premium, Some(PremiumKind::Sabbath));
/// assert_eq!(segments[1].minutes, 270);
/// ```
pub fn split_by_windows(
    start: NaiveDateTime,
    end: NaiveDateTime,
    windows: &[PremiumWindow],
) -> Vec<WindowSegment> {
    if end <= start {
        return Vec::new();
    }

    let mut cuts = vec![start];
    for window in windows {
        for edge in [window.start, window.end] {
            if edge > start && edge < end {
                cuts.push(edge);
            }
        }
    }
    cuts.push(end);
    cuts.sort();
    cuts.dedup();

    let offset = |at: NaiveDateTime| (at - start).num_minutes();

    cuts.windows(2)
        .filter_map(|pair| {
            let (segment_start, segment_end) = (pair[0], pair[1]);
            let minutes = offset(segment_end) - offset(segment_start);
            if minutes <= 0 {
                return None;
            }
            Some(WindowSegment {
                start_time: segment_start,
                end_time: segment_end,
                premium: governing_kind(windows, segment_start, segment_end),
                minutes,
            })
        })
        .collect()
}

fn governing_kind(
    windows: &[PremiumWindow],
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Option<PremiumKind> {
    let mut kinds = windows
        .iter()
        .filter(|w| w.contains(from, to))
        .map(|w| w.kind);

    let first = kinds.next()?;
    if first == PremiumKind::Sabbath || kinds.any(|k| k == PremiumKind::Sabbath) {
        Some(PremiumKind::Sabbath)
    } else {
        Some(PremiumKind::Holiday)
    }
}
