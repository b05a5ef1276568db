//! Forecasting models.

mod traits;

pub mod arima;

pub use arima::ARIMA;
pub use traits::{BoxedForecaster, Forecaster};
