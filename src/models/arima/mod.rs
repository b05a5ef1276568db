//! ARIMA (Autoregressive Integrated Moving Average) estimation and forecasting.
//!
//! This module provides:
//! - differencing and integration of a price series
//! - exact maximum-likelihood estimation of the ARMA part
//! - recursive business-day forecasts with optional prediction intervals
//! - a coefficient and residual diagnostics report

mod diagnostics;
mod diff;
mod estimator;
mod forecaster;
mod initial;
mod likelihood;
mod model;
mod order;
mod pipeline;
pub mod polynomial;

pub use diagnostics::{
    aic, bic, hqic, summarize, summarize_with, CoefficientRow, DiagnosticsConfig,
    DiagnosticsReport, ResidualDiagnostics,
};
pub use diff::{difference, integrate, Differenced};
pub use estimator::{
    conditional_residuals, estimate, fit_arima, ArmaEstimator, EstimationMethod,
    EstimationReport, EstimatorConfig, FittedModel, Trend,
};
pub use forecaster::{
    forecast, forecast_deltas, forecast_std_errors, forecast_values, forecast_with_intervals,
};
pub use initial::{hannan_rissanen, StartValues};
pub use likelihood::{filter, FilterSums, Initialization};
pub use model::ARIMA;
pub use order::ArimaOrder;
pub use pipeline::{
    fit_and_forecast, fit_and_forecast_default, fit_and_forecast_with, ArimaConfig, ArimaOutput,
};
