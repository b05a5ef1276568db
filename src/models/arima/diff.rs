//! Differencing and integration for ARIMA models.

use crate::error::{ForecastError, Result};

/// A d-times differenced series together with the values needed to invert it.
#[derive(Debug, Clone, PartialEq)]
pub struct Differenced {
    /// The differenced values (`len(series) - d` of them).
    pub values: Vec<f64>,
    /// For each pass `k` (0-based), the last value of the series before
    /// pass `k` was applied.
    pub seeds: Vec<f64>,
}

impl Differenced {
    /// Differencing order that produced this series.
    pub fn order(&self) -> usize {
        self.seeds.len()
    }
}

/// Apply differencing to a series `d` times.
///
/// Each pass computes `out[i] = in[i] - in[i-1]`, dropping the first element,
/// and records the last value of its input as the seed for that pass.
///
/// # Errors
/// [`ForecastError::InsufficientData`] when `series.len() <= d`.
///
/// # Example
/// ```
/// use arima_forecast::models::arima::difference;
///
/// let diff = difference(&[1.0, 3.0, 6.0, 10.0], 1).unwrap();
/// assert_eq!(diff.values, vec![2.0, 3.0, 4.0]);
/// assert_eq!(diff.seeds, vec![10.0]);
/// ```
pub fn difference(series: &[f64], d: usize) -> Result<Differenced> {
    if series.len() <= d {
        return Err(ForecastError::InsufficientData {
            needed: d + 1,
            got: series.len(),
        });
    }

    let mut seeds = Vec::with_capacity(d);
    let mut result = series.to_vec();
    for _ in 0..d {
        // Non-empty: len(series) > d guarantees at least one value per pass
        if let Some(&last) = result.last() {
            seeds.push(last);
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }

    Ok(Differenced {
        values: result,
        seeds,
    })
}

/// Integrate (reverse differencing) forecast deltas back to the original scale.
///
/// Performs `d` cumulative sums, innermost pass first, each seeded with the
/// corresponding value from [`Differenced::seeds`]. `d = 0` is the identity.
///
/// # Arguments
/// * `deltas` - Values on the d-times differenced scale
/// * `seeds` - Seeds retained by [`difference`]
/// * `d` - Differencing order used
pub fn integrate(deltas: &[f64], seeds: &[f64], d: usize) -> Vec<f64> {
    let mut result = deltas.to_vec();

    for level in (0..d).rev() {
        let mut cumsum = seeds.get(level).copied().unwrap_or(0.0);
        for value in result.iter_mut() {
            cumsum += *value;
            *value = cumsum;
        }
    }

    result
}
