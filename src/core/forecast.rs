//! Forecast result structure for holding dated predictions.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};

/// Lower/upper prediction interval bounds at a confidence level.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionInterval {
    /// Confidence level in (0, 1), e.g. 0.95.
    pub level: f64,
    /// Lower bounds, one per step.
    pub lower: Vec<f64>,
    /// Upper bounds, one per step.
    pub upper: Vec<f64>,
}

/// A dated point forecast on the original (undifferenced) scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    timestamps: Vec<DateTime<Utc>>,
    point: Vec<f64>,
    interval: Option<PredictionInterval>,
}

impl ForecastResult {
    /// Create a forecast from aligned timestamps and point predictions.
    pub fn new(timestamps: Vec<DateTime<Utc>>, point: Vec<f64>) -> Result<Self> {
        if timestamps.len() != point.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: point.len(),
            });
        }
        Ok(Self {
            timestamps,
            point,
            interval: None,
        })
    }

    /// Attach prediction interval bounds.
    pub fn with_interval(mut self, interval: PredictionInterval) -> Result<Self> {
        for bounds in [&interval.lower, &interval.upper] {
            if bounds.len() != self.point.len() {
                return Err(ForecastError::DimensionMismatch {
                    expected: self.point.len(),
                    got: bounds.len(),
                });
            }
        }
        self.interval = Some(interval);
        Ok(self)
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    /// Check if forecast is empty.
    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Forecast timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Point predictions.
    pub fn values(&self) -> &[f64] {
        &self.point
    }

    /// Prediction interval, if one was computed.
    pub fn interval(&self) -> Option<&PredictionInterval> {
        self.interval.as_ref()
    }

    /// Iterate over `(timestamp, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.point.iter().copied())
    }
}
