//! Error types for the arima-forecast library.

use crate::models::arima::ArimaOrder;
use thiserror::Error;

/// Result type alias for estimation and forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while differencing, fitting or forecasting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Not enough points to difference the series or identify the model.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Too many ARMA terms for the number of differenced observations.
    #[error("underdetermined model: ARMA({p},{q}) needs more than {n} differenced observations")]
    UnderdeterminedModel { p: usize, q: usize, n: usize },

    /// The optimizer exhausted its budget without meeting the convergence criteria.
    #[error(
        "estimation of ARIMA{order} did not converge after {iterations} iterations \
         (last log-likelihood {loglik:.6})"
    )]
    EstimationDiverged {
        order: ArimaOrder,
        iterations: usize,
        loglik: f64,
        /// Last coefficient vector: `[const?, ar.., ma..]`.
        params: Vec<f64>,
    },

    /// The forecast horizon must be at least one step.
    #[error("forecast horizon must be positive, got {horizon}")]
    ForecastHorizon { horizon: i64 },

    /// A component of the order triple is negative.
    #[error("invalid ARIMA order ({p}, {d}, {q}): orders must be non-negative")]
    InvalidOrder { p: i64, d: i64, q: i64 },

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// A NaN or infinite observation.
    #[error("non-finite value at index {index}")]
    NonFiniteValue { index: usize },

    /// Model must be fitted before prediction.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Estimation was cancelled by the caller.
    #[error("estimation cancelled")]
    Cancelled,

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = ForecastError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = ForecastError::InsufficientData { needed: 10, got: 5 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 10, got 5"
        );

        let err = ForecastError::UnderdeterminedModel { p: 3, q: 2, n: 4 };
        assert_eq!(
            err.to_string(),
            "underdetermined model: ARMA(3,2) needs more than 4 differenced observations"
        );

        let err = ForecastError::ForecastHorizon { horizon: -3 };
        assert_eq!(err.to_string(), "forecast horizon must be positive, got -3");

        let err = ForecastError::InvalidOrder { p: -1, d: 1, q: 0 };
        assert_eq!(
            err.to_string(),
            "invalid ARIMA order (-1, 1, 0): orders must be non-negative"
        );
    }

    #[test]
    fn diverged_error_carries_context() {
        let err = ForecastError::EstimationDiverged {
            order: ArimaOrder::from_usize(2, 1, 1),
            iterations: 50,
            loglik: -123.5,
            params: vec![0.1, 0.5, -0.2, 0.3],
        };
        let msg = err.to_string();
        assert!(msg.contains("ARIMA(2,1,1)"));
        assert!(msg.contains("50 iterations"));
        assert!(msg.contains("-123.5"));
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = ForecastError::Cancelled;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
