//! Forecaster trait defining the fit/predict interface of a model.

use crate::core::{ForecastResult, TimeSeries};
use crate::error::Result;

/// Common interface for dated forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the time series data.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Generate predictions for the next `horizon` business days.
    fn predict(&self, horizon: usize) -> Result<ForecastResult>;

    /// Generate predictions with prediction intervals.
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<ForecastResult> {
        let _ = level;
        self.predict(horizon)
    }

    /// Get the fitted values (in-sample one-step predictions).
    fn fitted_values(&self) -> Option<Vec<f64>>;

    /// Get the residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.residuals().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
pub type BoxedForecaster = Box<dyn Forecaster + Send + Sync>;
