//! TimeSeries data structure for representing a univariate price series.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, NaiveDate, Utc};

/// An ordered univariate series of `(timestamp, value)` observations.
///
/// Timestamps are strictly increasing and every value is finite. Days without
/// an observation (weekends, exchange holidays) are simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    label: Option<String>,
}

impl TimeSeries {
    /// Create a univariate time series, validating ordering and finiteness.
    pub fn univariate(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        // Validate timestamps are strictly increasing
        for i in 1..timestamps.len() {
            if timestamps[i] <= timestamps[i - 1] {
                return Err(ForecastError::TimestampError(format!(
                    "timestamps must be strictly increasing (index {} is {} after {})",
                    i,
                    timestamps[i],
                    timestamps[i - 1]
                )));
            }
        }

        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::NonFiniteValue { index });
        }

        Ok(Self {
            timestamps,
            values,
            label: None,
        })
    }

    /// Create a series from `(timestamp, value)` pairs.
    pub fn from_pairs(pairs: Vec<(DateTime<Utc>, f64)>) -> Result<Self> {
        let (timestamps, values) = pairs.into_iter().unzip();
        Self::univariate(timestamps, values)
    }

    /// Create a series of daily closes keyed by trading date (midnight UTC).
    pub fn from_daily_closes(closes: Vec<(NaiveDate, f64)>) -> Result<Self> {
        let pairs = closes
            .into_iter()
            .map(|(date, close)| (date.and_time(chrono::NaiveTime::MIN).and_utc(), close))
            .collect();
        Self::from_pairs(pairs)
    }

    /// Attach a display label (e.g. a ticker symbol).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Get timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Get values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Timestamp of the last observation.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Iterate over `(timestamp, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_daily_timestamps(n: usize) -> Vec<DateTime<Utc>> {
        (0..n)
            .map(|i| {
                Utc.with_ymd_and_hms(2024, 1, 1 + i as u32, 0, 0, 0)
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn time_series_constructs_univariate_data() {
        let timestamps = make_daily_timestamps(5);
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];

        let ts = TimeSeries::univariate(timestamps.clone(), values.clone()).unwrap();

        assert_eq!(ts.len(), 5);
        assert!(!ts.is_empty());
        assert_eq!(ts.values(), &values);
        assert_eq!(ts.timestamps(), &timestamps);
        assert_eq!(ts.last_timestamp(), Some(timestamps[4]));
        assert!(ts.label().is_none());
    }

    #[test]
    fn time_series_rejects_non_increasing_timestamps() {
        // Non-monotonic timestamps
        let timestamps = vec![
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(), // goes backward
        ];
        let result = TimeSeries::univariate(timestamps, vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(ForecastError::TimestampError(_))));

        // Duplicate timestamps
        let timestamps = vec![
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(), // duplicate
        ];
        let result = TimeSeries::univariate(timestamps, vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(ForecastError::TimestampError(_))));
    }

    #[test]
    fn time_series_rejects_non_finite_values() {
        let result = TimeSeries::univariate(make_daily_timestamps(3), vec![1.0, f64::NAN, 3.0]);
        assert_eq!(result, Err(ForecastError::NonFiniteValue { index: 1 }));

        let result =
            TimeSeries::univariate(make_daily_timestamps(2), vec![1.0, f64::INFINITY]);
        assert_eq!(result, Err(ForecastError::NonFiniteValue { index: 1 }));
    }

    #[test]
    fn time_series_rejects_length_mismatch() {
        let result = TimeSeries::univariate(make_daily_timestamps(3), vec![1.0, 2.0]);
        assert_eq!(
            result,
            Err(ForecastError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        );
    }

    #[test]
    fn time_series_from_daily_closes_uses_midnight_utc() {
        let closes = vec![
            (NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(), 125.07),
            (NaiveDate::from_ymd_opt(2023, 1, 4).unwrap(), 126.36),
        ];
        let ts = TimeSeries::from_daily_closes(closes)
            .unwrap()
            .with_label("AAPL");

        assert_eq!(ts.label(), Some("AAPL"));
        assert_eq!(
            ts.timestamps()[0],
            Utc.with_ymd_and_hms(2023, 1, 3, 0, 0, 0).unwrap()
        );
        let pairs: Vec<_> = ts.iter().collect();
        assert_eq!(pairs[1].1, 126.36);
    }

    #[test]
    fn empty_series_is_valid() {
        let ts = TimeSeries::univariate(vec![], vec![]).unwrap();
        assert!(ts.is_empty());
        assert!(ts.last_timestamp().is_none());
    }
}
