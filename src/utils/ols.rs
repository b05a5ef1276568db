//! Ordinary Least Squares (OLS) regression on positional regressors.
//!
//! Used by the conditional least-squares start-value search, where the
//! regressors are lagged observations and lagged residuals.

use crate::error::{ForecastError, Result};
use crate::utils::linalg::solve_symmetric;

/// OLS regression coefficients and intercept.
#[derive(Debug, Clone)]
pub struct OLSResult {
    /// Regression coefficients (one per regressor column).
    pub coefficients: Vec<f64>,
    /// Intercept term (0 when fitted without one).
    pub intercept: f64,
}

impl OLSResult {
    /// Predict values using the fitted OLS model.
    pub fn predict(&self, columns: &[Vec<f64>]) -> Result<Vec<f64>> {
        if columns.len() != self.coefficients.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.coefficients.len(),
                got: columns.len(),
            });
        }

        let n = columns.first().map(|c| c.len()).unwrap_or(0);
        for col in columns {
            if col.len() != n {
                return Err(ForecastError::DimensionMismatch {
                    expected: n,
                    got: col.len(),
                });
            }
        }

        // Compute predictions: intercept + sum(coef_i * x_i)
        let mut predictions = vec![self.intercept; n];
        for (coef, col) in self.coefficients.iter().zip(columns) {
            for (pred, x) in predictions.iter_mut().zip(col) {
                *pred += coef * x;
            }
        }

        Ok(predictions)
    }

    /// Residuals `y - y_hat` for the given data.
    pub fn residuals(&self, y: &[f64], columns: &[Vec<f64>]) -> Result<Vec<f64>> {
        let predictions = self.predict(columns)?;
        if columns.is_empty() {
            return Ok(y.iter().map(|v| v - self.intercept).collect());
        }
        if predictions.len() != y.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: y.len(),
                got: predictions.len(),
            });
        }
        Ok(y.iter()
            .zip(predictions.iter())
            .map(|(yi, pi)| yi - pi)
            .collect())
    }
}

/// Fit OLS regression: y = intercept + X @ coefficients
///
/// Uses Cholesky decomposition to solve the normal equations.
///
/// # Arguments
/// * `y` - Target values (length n)
/// * `columns` - Regressor columns (each length n)
/// * `with_intercept` - Whether to estimate an intercept
pub fn ols_fit(y: &[f64], columns: &[Vec<f64>], with_intercept: bool) -> Result<OLSResult> {
    let n = y.len();

    if n == 0 {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }

    for col in columns {
        if col.len() != n {
            return Err(ForecastError::DimensionMismatch {
                expected: n,
                got: col.len(),
            });
        }
    }

    if columns.is_empty() {
        let intercept = if with_intercept {
            y.iter().sum::<f64>() / n as f64
        } else {
            0.0
        };
        return Ok(OLSResult {
            coefficients: vec![],
            intercept,
        });
    }

    let offset = usize::from(with_intercept);
    let num_params = columns.len() + offset;
    if n < num_params {
        return Err(ForecastError::InsufficientData {
            needed: num_params,
            got: n,
        });
    }

    // Design row = [1?, x1, x2, ...]
    let row = |obs: usize| -> Vec<f64> {
        let mut r = Vec::with_capacity(num_params);
        if with_intercept {
            r.push(1.0);
        }
        r.extend(columns.iter().map(|c| c[obs]));
        r
    };

    let mut xtx = vec![vec![0.0; num_params]; num_params];
    let mut xty = vec![0.0; num_params];

    for obs in 0..n {
        let x = row(obs);
        for i in 0..num_params {
            xty[i] += x[i] * y[obs];
            for j in 0..num_params {
                xtx[i][j] += x[i] * x[j];
            }
        }
    }

    // Add small regularization to diagonal for numerical stability
    for i in 0..num_params {
        xtx[i][i] += 1e-8;
    }

    let beta = solve_symmetric(&xtx, &xty).ok_or_else(|| {
        ForecastError::ComputationError(
            "OLS regression failed: matrix not positive definite".into(),
        )
    })?;

    Ok(OLSResult {
        intercept: if with_intercept { beta[0] } else { 0.0 },
        coefficients: beta[offset..].to_vec(),
    })
}
