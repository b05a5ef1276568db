//! ARIMA model behind the [`Forecaster`] interface.

use super::diagnostics::{aic, bic, summarize, DiagnosticsReport};
use super::estimator::{fit_arima, EstimatorConfig, FittedModel};
use super::forecaster::{forecast, forecast_with_intervals};
use super::order::ArimaOrder;
use crate::core::{ForecastResult, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use chrono::{DateTime, Utc};

/// ARIMA(p, d, q) forecasting model.
///
/// ARIMA(p, d, q) combines:
/// - AR(p): Autoregressive component
/// - I(d): Differencing to remove trends
/// - MA(q): Moving average component
///
/// # Example
/// ```
/// use arima_forecast::core::TimeSeries;
/// use arima_forecast::models::arima::ARIMA;
/// use arima_forecast::models::Forecaster;
/// use chrono::{Duration, TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let timestamps: Vec<_> = (0..60).map(|i| start + Duration::days(i)).collect();
/// let values: Vec<f64> = (0..60)
///     .map(|i| 10.0 + 0.1 * i as f64 + ((i * 37) % 11) as f64 / 11.0)
///     .collect();
/// let series = TimeSeries::univariate(timestamps, values).unwrap();
///
/// let mut model = ARIMA::new(1, 1, 0);
/// model.fit(&series).unwrap();
/// let forecast = model.predict(5).unwrap();
/// assert_eq!(forecast.horizon(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct ARIMA {
    order: ArimaOrder,
    config: EstimatorConfig,
    fitted: Option<FittedModel>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl ARIMA {
    /// Create a new ARIMA model.
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self::from_order(ArimaOrder::from_usize(p, d, q))
    }

    /// Create a model from a validated order.
    pub fn from_order(order: ArimaOrder) -> Self {
        Self {
            order,
            config: EstimatorConfig::default(),
            fitted: None,
            last_timestamp: None,
        }
    }

    /// Create an AR(p) model (ARIMA with d=0, q=0).
    pub fn ar(p: usize) -> Self {
        Self::new(p, 0, 0)
    }

    /// Create an MA(q) model (ARIMA with p=0, d=0).
    pub fn ma(q: usize) -> Self {
        Self::new(0, 0, q)
    }

    /// Replace the estimator configuration.
    pub fn with_config(mut self, config: EstimatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Model order.
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// The estimate, once fitted.
    pub fn fitted(&self) -> Option<&FittedModel> {
        self.fitted.as_ref()
    }

    /// Diagnostics summary of the fitted model.
    pub fn summary(&self) -> Result<DiagnosticsReport> {
        self.fitted
            .as_ref()
            .map(summarize)
            .ok_or(ForecastError::FitRequired)
    }

    /// Get AIC.
    pub fn aic(&self) -> Option<f64> {
        self.fitted.as_ref().map(|m| aic(m.loglik(), m.num_params()))
    }

    /// Get BIC.
    pub fn bic(&self) -> Option<f64> {
        self.fitted
            .as_ref()
            .map(|m| bic(m.loglik(), m.num_params(), m.nobs()))
    }

    fn fitted_state(&self) -> Result<(&FittedModel, DateTime<Utc>)> {
        match (&self.fitted, self.last_timestamp) {
            (Some(model), Some(last)) => Ok((model, last)),
            _ => Err(ForecastError::FitRequired),
        }
    }
}

impl Default for ARIMA {
    fn default() -> Self {
        Self::from_order(ArimaOrder::default())
    }
}

impl Forecaster for ARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let last = series.last_timestamp().ok_or(ForecastError::EmptyData)?;
        let model = fit_arima(series.values(), self.order, &self.config)?;
        self.fitted = Some(model);
        self.last_timestamp = Some(last);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<ForecastResult> {
        let (model, last) = self.fitted_state()?;
        forecast(model, last, horizon)
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<ForecastResult> {
        let (model, last) = self.fitted_state()?;
        forecast_with_intervals(model, last, horizon, level)
    }

    fn fitted_values(&self) -> Option<Vec<f64>> {
        self.fitted.as_ref().map(FittedModel::fitted_values)
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(FittedModel::residuals)
    }

    fn name(&self) -> &str {
        "ARIMA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoxedForecaster;
    use chrono::{Duration, TimeZone};

    fn make_series(values: Vec<f64>) -> TimeSeries {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let timestamps = (0..values.len())
            .map(|i| base + Duration::days(i as i64))
            .collect();
        TimeSeries::univariate(timestamps, values).unwrap()
    }

    fn trending(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + 0.5 * i as f64 + ((i * 53) % 17) as f64 / 17.0)
            .collect()
    }

    fn level(n: usize) -> Vec<f64> {
        (0..n).map(|i| 5.0 + ((i * 53) % 17) as f64 / 17.0).collect()
    }

    #[test]
    fn arima_fit_and_predict() {
        let mut model = ARIMA::new(1, 1, 1);
        assert!(!model.is_fitted());

        model.fit(&make_series(trending(80))).unwrap();
        assert!(model.is_fitted());

        let forecast = model.predict(5).unwrap();
        assert_eq!(forecast.horizon(), 5);
        assert!(forecast.values().iter().all(|v| v.is_finite()));
        assert!(model.aic().is_some());
        assert!(model.bic().is_some());
    }

    #[test]
    fn arima_requires_fit() {
        let model = ARIMA::default();
        assert_eq!(model.predict(3), Err(ForecastError::FitRequired));
        assert!(matches!(model.summary(), Err(ForecastError::FitRequired)));
        assert!(model.fitted_values().is_none());
    }

    #[test]
    fn arima_zero_horizon() {
        let mut model = ARIMA::ar(1);
        model.fit(&make_series(level(40))).unwrap();
        assert_eq!(
            model.predict(0),
            Err(ForecastError::ForecastHorizon { horizon: 0 })
        );
    }

    #[test]
    fn arima_insufficient_data() {
        let mut model = ARIMA::new(2, 1, 2);
        let err = model.fit(&make_series(vec![1.0, 2.0, 3.0, 4.0])).unwrap_err();
        assert_eq!(err, ForecastError::UnderdeterminedModel { p: 2, q: 2, n: 3 });
    }

    #[test]
    fn arima_summary_and_intervals() {
        let mut model = ARIMA::ma(1);
        model.fit(&make_series(level(60))).unwrap();
        let summary = model.summary().unwrap();
        assert_eq!(summary.order, ArimaOrder::from_usize(0, 0, 1));

        let forecast = model.predict_with_intervals(4, 0.9).unwrap();
        assert!(forecast.interval().is_some());
    }

    #[test]
    fn arima_as_trait_object() {
        let mut model: BoxedForecaster = Box::new(ARIMA::default());
        assert_eq!(model.name(), "ARIMA");
        model.fit(&make_series(trending(50))).unwrap();
        assert_eq!(model.residuals().map(|r| r.len()), Some(48));
    }
}
