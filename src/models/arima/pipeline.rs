//! One-call estimation, forecast and summary for a price series.

use super::diagnostics::{summarize_with, DiagnosticsConfig, DiagnosticsReport};
use super::estimator::{fit_arima, EstimatorConfig, FittedModel};
use super::forecaster::{forecast, forecast_with_intervals};
use super::order::ArimaOrder;
use crate::core::{ForecastResult, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::utils::cancel::CancellationToken;
use tracing::info;

/// Configuration for [`fit_and_forecast_with`].
#[derive(Debug, Clone)]
pub struct ArimaConfig {
    /// Default forecast horizon in business days.
    pub horizon: usize,
    /// Prediction interval level; `None` for point forecasts only.
    pub interval_level: Option<f64>,
    /// Estimator settings.
    pub estimator: EstimatorConfig,
    /// Diagnostics settings.
    pub diagnostics: DiagnosticsConfig,
}

impl Default for ArimaConfig {
    fn default() -> Self {
        Self {
            horizon: 30,
            interval_level: None,
            estimator: EstimatorConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl ArimaConfig {
    /// Set the default horizon.
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Request prediction intervals at `level`.
    pub fn with_interval_level(mut self, level: f64) -> Self {
        self.interval_level = Some(level);
        self
    }

    /// Replace the estimator settings.
    pub fn with_estimator(mut self, estimator: EstimatorConfig) -> Self {
        self.estimator = estimator;
        self
    }

    /// Replace the diagnostics settings.
    pub fn with_diagnostics(mut self, diagnostics: DiagnosticsConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Attach a cancellation token to the estimator.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.estimator.cancel = Some(token);
        self
    }
}

/// Everything produced by one estimation-and-forecast request.
#[derive(Debug, Clone)]
pub struct ArimaOutput {
    pub model: FittedModel,
    pub forecast: ForecastResult,
    pub report: DiagnosticsReport,
}

/// Fit ARIMA(p, d, q) to `series` and forecast `h` business days.
///
/// Takes signed inputs as entered by a caller; negative orders fail with
/// [`ForecastError::InvalidOrder`] and `h <= 0` with
/// [`ForecastError::ForecastHorizon`].
///
/// # Example
/// ```
/// use arima_forecast::core::TimeSeries;
/// use arima_forecast::models::arima::fit_and_forecast;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let closes: Vec<(NaiveDate, f64)> = (0..100)
///     .map(|i| {
///         let date = start + chrono::Duration::days(i);
///         (date, 150.0 + 0.2 * i as f64 + ((i * 31) % 7) as f64 * 0.3)
///     })
///     .collect();
/// let series = TimeSeries::from_daily_closes(closes).unwrap();
///
/// let out = fit_and_forecast(&series, 1, 1, 0, 10).unwrap();
/// assert_eq!(out.forecast.horizon(), 10);
/// assert_eq!(out.report.coefficients[1].name, "ar.L1");
/// ```
pub fn fit_and_forecast(series: &TimeSeries, p: i64, d: i64, q: i64, h: i64) -> Result<ArimaOutput> {
    let order = ArimaOrder::new(p, d, q)?;
    let horizon = usize::try_from(h)
        .ok()
        .filter(|&h| h > 0)
        .ok_or(ForecastError::ForecastHorizon { horizon: h })?;
    fit_and_forecast_with(series, order, horizon, &ArimaConfig::default())
}

/// Fit `order` to `series` and forecast `horizon` business days under `config`.
pub fn fit_and_forecast_with(
    series: &TimeSeries,
    order: ArimaOrder,
    horizon: usize,
    config: &ArimaConfig,
) -> Result<ArimaOutput> {
    if horizon == 0 {
        return Err(ForecastError::ForecastHorizon { horizon: 0 });
    }
    let last = series.last_timestamp().ok_or(ForecastError::EmptyData)?;

    let model = fit_arima(series.values(), order, &config.estimator)?;
    let forecast = match config.interval_level {
        Some(level) => forecast_with_intervals(&model, last, horizon, level)?,
        None => forecast(&model, last, horizon)?,
    };
    let report = summarize_with(&model, &config.diagnostics);

    info!(
        series = series.label().unwrap_or("<unnamed>"),
        %order,
        horizon,
        aic = report.aic,
        "ARIMA forecast complete"
    );

    Ok(ArimaOutput {
        model,
        forecast,
        report,
    })
}

/// Run [`fit_and_forecast_with`] with the configured default horizon.
pub fn fit_and_forecast_default(
    series: &TimeSeries,
    order: ArimaOrder,
    config: &ArimaConfig,
) -> Result<ArimaOutput> {
    fit_and_forecast_with(series, order, config.horizon, config)
}
