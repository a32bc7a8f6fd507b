//! Utility functions for date windows and log formatting.

use chrono::{Days, NaiveDate, Utc};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt::Display;

/// Today's date in UTC.
pub fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Inclusive search window ending at `today` and starting `days` earlier.
///
/// With `days == 1` this is yesterday through today. A window reaching past
/// the earliest representable date starts at [`NaiveDate::MIN`].
pub fn date_window(today: NaiveDate, days: u64) -> (NaiveDate, NaiveDate) {
    let from = today
        .checked_sub_days(Days::new(days))
        .unwrap_or(NaiveDate::MIN);
    (from, today)
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last character boundary at or before `max`
/// bytes, with an ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Render a date-keyed map as `{2024-01-01: 0.35, 2024-01-02: -0.1}`.
pub fn format_daily<V: Display>(map: &BTreeMap<NaiveDate, V>) -> String {
    format!(
        "{{{}}}",
        map.iter().map(|(date, v)| format!("{date}: {v}")).join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        // 'é' is two bytes; cutting at 3 would split the second one.
        let result = truncate_for_log("éééé", 3);
        assert_eq!(result, "é…(+6 bytes)");
    }

    #[test]
    fn test_date_window_one_day() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let (from, to) = date_window(today, 1);
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(to, today);
    }

    #[test]
    fn test_date_window_crosses_year() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let (from, _) = date_window(today, 7);
        assert_eq!(from, NaiveDate::from_ymd_opt(2023, 12, 26).unwrap());
    }

    #[test]
    fn test_date_window_saturates_instead_of_panicking() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let (from, to) = date_window(today, u64::MAX);
        assert_eq!(from, NaiveDate::MIN);
        assert_eq!(to, today);
    }

    #[test]
    fn test_format_daily() {
        let map = BTreeMap::from([
            (NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), -0.1),
            (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 0.35),
        ]);
        assert_eq!(format_daily(&map), "{2024-01-01: 0.35, 2024-01-02: -0.1}");
        assert_eq!(format_daily(&BTreeMap::<NaiveDate, f64>::new()), "{}");
    }
}
