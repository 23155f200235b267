//! Calendar classification of a date.
//!
//! This is the shape the calendar provider returns: whether a date is an
//! official holiday or Sabbath, its name, and the precise boundaries of the
//! premium window when known.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Which premium rules govern time inside a classification's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumKind {
    /// Weekly rest day: 1.5x within the norm, 1.75x beyond.
    Sabbath,
    /// Official holiday that is not also a Sabbath: flat 1.5x.
    Holiday,
}

/// The calendar classification of a single date.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{DayClassification, PremiumKind};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// let plain = DayClassification::ordinary(date);
/// assert!(!plain.is_special());
/// assert_eq!(plain.premium_kind(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayClassification {
    /// The classified date.
    pub date: NaiveDate,
    /// Official holiday.
    pub is_holiday: bool,
    /// Weekly Sabbath.
    pub is_shabbat: bool,
    /// A Sabbath with a special name (e.g., one falling inside a festival).
    #[serde(default)]
    pub is_special_shabbat: bool,
    /// Name of the holiday or special Sabbath.
    #[serde(default)]
    pub name: Option<String>,
    /// Precise start of the premium window.
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    /// Precise end of the premium window.
    #[serde(default)]
    pub end_time: Option<NaiveDateTime>,
    /// True when the answer came from the seasonal estimate.
    #[serde(default)]
    pub is_estimated: bool,
}

impl DayClassification {
    /// A plain working day with no premium.
    pub fn ordinary(date: NaiveDate) -> Self {
        Self {
            date,
            is_holiday: false,
            is_shabbat: false,
            is_special_shabbat: false,
            name: None,
            start_time: None,
            end_time: None,
            is_estimated: false,
        }
    }

    /// True for Sabbaths and official holidays.
    pub fn is_special(&self) -> bool {
        self.is_holiday || self.is_shabbat
    }

    /// Sabbath wins over holiday when both apply.
    pub fn premium_kind(&self) -> Option<PremiumKind> {
        if self.is_shabbat {
            Some(PremiumKind::Sabbath)
        } else if self.is_holiday {
            Some(PremiumKind::Holiday)
        } else {
            None
        }
    }

    /// Returns the `[start, end)` premium window and the rules inside it.
    ///
    /// Missing boundaries fall back to the edges of the calendar day.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{DayClassification, PremiumKind};
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2025, 4, 13).unwrap();
    /// let mut holiday = DayClassification::ordinary(date);
    /// holiday.is_holiday = true;
    ///
    /// let window = holiday.premium_window().unwrap();
    /// assert_eq!(window.start, date.and_hms_opt(0, 0, 0).unwrap());
    /// assert_eq!(window.end, date.succ_opt().unwrap().and_hms_opt(0, 0, 0).unwrap());
    /// assert_eq!(window.kind, PremiumKind::Holiday);
    /// ```
    pub fn premium_window(&self) -> Option<PremiumWindow> {
        let kind = self.premium_kind()?;

        let day_start = self.date.and_time(chrono::NaiveTime::MIN);
        let start = self.start_time.unwrap_or(day_start);
        let end = self.end_time.unwrap_or(day_start + Duration::days(1));

        if end <= start {
            return None;
        }

        Some(PremiumWindow { start, end, kind })
    }

    /// True if `[from, to)` overlaps the premium window.
    pub fn overlaps(&self, from: NaiveDateTime, to: NaiveDateTime) -> bool {
        self.premium_window()
            .is_some_and(|window| window.overlaps(from, to))
    }
}

/// A `[start, end)` span paid under Sabbath or holiday rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumWindow {
    /// Window opens.
    pub start: NaiveDateTime,
    /// Window closes.
    pub end: NaiveDateTime,
    /// Rules governing minutes inside the window.
    pub kind: PremiumKind,
}

impl PremiumWindow {
    /// True if `[from, to)` overlaps the window.
    pub fn overlaps(&self, from: NaiveDateTime, to: NaiveDateTime) -> bool {
        from < self.end && to > self.start
    }

    /// True if `[from, to)` lies entirely inside the window.
    pub fn contains(&self, from: NaiveDateTime, to: NaiveDateTime) -> bool {
        from >= self.start && to <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn sabbath() -> DayClassification {
        DayClassification {
            date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            is_holiday: false,
            is_shabbat: true,
            is_special_shabbat: false,
            name: Some("Shabbat".to_string()),
            start_time: Some(make_datetime("2025-03-14", "17:30:00")),
            end_time: Some(make_datetime("2025-03-15", "18:30:00")),
            is_estimated: false,
        }
    }

    #[test]
    fn test_sabbath_takes_precedence_over_holiday() {
        let mut day = sabbath();
        day.is_holiday = true;
        assert_eq!(day.premium_kind(), Some(PremiumKind::Sabbath));
    }

    #[test]
    fn test_holiday_kind() {
        let mut day = DayClassification::ordinary(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
        day.is_holiday = true;
        assert_eq!(day.premium_kind(), Some(PremiumKind::Holiday));
    }

    #[test]
    fn test_sabbath_window_uses_precise_boundaries() {
        let window = sabbath().premium_window().unwrap();
        assert_eq!(window.start, make_datetime("2025-03-14", "17:30:00"));
        assert_eq!(window.end, make_datetime("2025-03-15", "18:30:00"));
        assert_eq!(window.kind, PremiumKind::Sabbath);
    }

    #[test]
    fn test_overlap_detection() {
        let day = sabbath();
        assert!(day.overlaps(
            make_datetime("2025-03-14", "14:00:00"),
            make_datetime("2025-03-14", "22:00:00")
        ));
        assert!(!day.overlaps(
            make_datetime("2025-03-14", "08:00:00"),
            make_datetime("2025-03-14", "17:30:00")
        ));
    }

    #[test]
    fn test_ordinary_day_has_no_window() {
        let day = DayClassification::ordinary(NaiveDate::from_ymd_opt(2025, 3, 12).unwrap());
        assert!(day.premium_window().is_none());
        assert!(!day.overlaps(
            make_datetime("2025-03-12", "00:00:00"),
            make_datetime("2025-03-13", "00:00:00")
        ));
    }

    #[test]
    fn test_classification_deserialization_defaults() {
        let json = r#"{
            "date": "2025-03-15",
            "is_holiday": false,
            "is_shabbat": true
        }"#;
        let day: DayClassification = serde_json::from_str(json).unwrap();
        assert!(day.is_shabbat);
        assert!(!day.is_estimated);
        assert!(day.name.is_none());
    }
}
