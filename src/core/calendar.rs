//! Business-day date arithmetic for forecast indices.
//!
//! Forecast timestamps follow a plain Monday–Friday frequency: weekends are
//! skipped, exchange holidays are not.

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};

/// Check whether a timestamp falls on a weekday.
pub fn is_business_day(timestamp: &DateTime<Utc>) -> bool {
    !matches!(timestamp.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The first business day strictly after `timestamp`, keeping the time of day.
pub fn next_business_day(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    let days = match timestamp.weekday() {
        Weekday::Fri => 3,
        Weekday::Sat => 2,
        _ => 1,
    };
    timestamp + Duration::days(days)
}

/// The next `n` business days strictly after `last`.
pub fn next_business_days(last: DateTime<Utc>, n: usize) -> Vec<DateTime<Utc>> {
    let mut dates = Vec::with_capacity(n);
    let mut current = last;
    for _ in 0..n {
        current = next_business_day(current);
        dates.push(current);
    }
    dates
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn friday_rolls_to_monday() {
        // 2022-12-30 is a Friday
        assert_eq!(next_business_day(day(2022, 12, 30)), day(2023, 1, 2));
    }

    #[test]
    fn weekend_rolls_to_monday() {
        assert_eq!(next_business_day(day(2023, 1, 7)), day(2023, 1, 9));
        assert_eq!(next_business_day(day(2023, 1, 8)), day(2023, 1, 9));
    }

    #[test]
    fn holidays_are_not_skipped() {
        // 2023-12-25 (Christmas, Monday) is still a forecast date
        let dates = next_business_days(day(2023, 12, 22), 2);
        assert_eq!(dates, vec![day(2023, 12, 25), day(2023, 12, 26)]);
    }

    #[test]
    fn next_business_days_spans_weeks() {
        // Wednesday 2023-01-04
        let dates = next_business_days(day(2023, 1, 4), 7);
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], day(2023, 1, 5));
        assert_eq!(dates[2], day(2023, 1, 9));
        assert_eq!(dates[6], day(2023, 1, 13));
        assert!(dates.iter().all(is_business_day));
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn time_of_day_is_preserved() {
        let last = Utc.with_ymd_and_hms(2023, 3, 1, 21, 0, 0).unwrap();
        let next = next_business_day(last);
        assert_eq!(next, Utc.with_ymd_and_hms(2023, 3, 2, 21, 0, 0).unwrap());
    }

    #[test]
    fn zero_days_is_empty() {
        assert!(next_business_days(day(2023, 1, 4), 0).is_empty());
    }
}
