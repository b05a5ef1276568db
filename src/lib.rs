//! # arima-forecast
//!
//! ARIMA(p, d, q) estimation and forecasting for daily price series.
//!
//! A series is differenced `d` times, the ARMA(p, q) part is estimated by
//! exact maximum likelihood (Kalman filter, BFGS), and forecasts are
//! integrated back to the price scale and dated on the following business
//! days. A diagnostics report gives the coefficient table, information
//! criteria and residual checks.
//!
//! ```
//! use arima_forecast::prelude::*;
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let closes: Vec<(NaiveDate, f64)> = (0..120)
//!     .map(|i| {
//!         let noise = ((i * 7919) % 89) as f64 / 89.0 - 0.5;
//!         (start + chrono::Duration::days(i), 100.0 + 0.1 * i as f64 + noise)
//!     })
//!     .collect();
//! let series = TimeSeries::from_daily_closes(closes).unwrap();
//!
//! let out = fit_and_forecast(&series, 1, 1, 1, 30).unwrap();
//! assert_eq!(out.forecast.horizon(), 30);
//! println!("{}", out.report);
//! ```

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod error;
pub mod models;
pub mod utils;
pub mod validation;

pub use error::{ForecastError, Result};
pub use models::arima::{
    difference, fit_and_forecast, fit_and_forecast_with, forecast, integrate, summarize,
    ArimaConfig, ArimaOrder, ArmaEstimator, DiagnosticsReport, FittedModel,
};

pub mod prelude {
    pub use crate::core::{ForecastResult, TimeSeries};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::arima::{
        fit_and_forecast, fit_and_forecast_with, ArimaConfig, ArimaOrder, EstimatorConfig,
    };
    pub use crate::models::Forecaster;
    pub use crate::utils::{quantile_normal, CancellationToken};
}
