//! Core data structures for time series forecasting.

pub mod calendar;
mod forecast;
mod time_series;

pub use calendar::{is_business_day, next_business_day, next_business_days};
pub use forecast::{ForecastResult, PredictionInterval};
pub use time_series::TimeSeries;
