//! Recursive multi-step forecasts from a fitted ARIMA model.

use super::diff::integrate;
use super::estimator::FittedModel;
use super::polynomial::psi_weights;
use crate::core::{next_business_days, ForecastResult, PredictionInterval};
use crate::error::{ForecastError, Result};
use crate::utils::stats::quantile_normal;
use chrono::{DateTime, Utc};

/// Point forecasts on the differenced scale.
///
/// Future innovations are zero; each prediction is fed back as a lagged
/// value for the next step.
pub fn forecast_deltas(model: &FittedModel, h: usize) -> Vec<f64> {
    let ar = model.ar();
    let ma = model.ma();
    let c = model.intercept();

    let mut values = model.differenced().to_vec();
    let mut innovations = vec![0.0; values.len() - model.residuals().len()];
    innovations.extend_from_slice(model.residuals());

    let n = values.len();
    for _ in 0..h {
        let t = values.len();
        let mut pred = c;
        for (i, phi) in ar.iter().enumerate() {
            if t > i {
                pred += phi * values[t - 1 - i];
            }
        }
        for (j, theta) in ma.iter().enumerate() {
            if t > j {
                pred += theta * innovations[t - 1 - j];
            }
        }
        values.push(pred);
        innovations.push(0.0);
    }

    values.split_off(n)
}

/// Point forecasts on the original scale with no date index.
pub fn forecast_values(model: &FittedModel, h: usize) -> Vec<f64> {
    let deltas = forecast_deltas(model, h);
    integrate(&deltas, model.seeds(), model.order().d)
}

/// Forecast `h` steps ahead, dated on the business days after `last_timestamp`.
///
/// # Errors
/// [`ForecastError::ForecastHorizon`] when `h == 0`.
pub fn forecast(
    model: &FittedModel,
    last_timestamp: DateTime<Utc>,
    h: usize,
) -> Result<ForecastResult> {
    if h == 0 {
        return Err(ForecastError::ForecastHorizon { horizon: 0 });
    }
    let values = forecast_values(model, h);
    ForecastResult::new(next_business_days(last_timestamp, h), values)
}

/// Standard deviations of the 1..=h step forecast errors on the original scale.
pub fn forecast_std_errors(model: &FittedModel, h: usize) -> Vec<f64> {
    let psi = psi_weights(model.ar(), model.ma(), model.order().d, h);
    let mut acc = 0.0;
    psi.iter()
        .map(|w| {
            acc += w * w;
            (model.sigma2() * acc).sqrt()
        })
        .collect()
}

/// Forecast with symmetric normal prediction intervals at `level`.
///
/// # Errors
/// - [`ForecastError::ForecastHorizon`] when `h == 0`
/// - [`ForecastError::InvalidParameter`] when `level` is not in (0, 1)
pub fn forecast_with_intervals(
    model: &FittedModel,
    last_timestamp: DateTime<Utc>,
    h: usize,
    level: f64,
) -> Result<ForecastResult> {
    if !(level > 0.0 && level < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "interval level must be in (0, 1), got {level}"
        )));
    }
    let point = forecast(model, last_timestamp, h)?;

    let z = quantile_normal(0.5 + level / 2.0);
    let se = forecast_std_errors(model, h);
    let lower = point
        .values()
        .iter()
        .zip(&se)
        .map(|(v, s)| v - z * s)
        .collect();
    let upper = point
        .values()
        .iter()
        .zip(&se)
        .map(|(v, s)| v + z * s)
        .collect();

    point.with_interval(PredictionInterval {
        level,
        lower,
        upper,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::arima::{fit_arima, ArimaOrder, EstimatorConfig, Trend};
    use approx::assert_relative_eq;
    use chrono::{Datelike, TimeZone, Weekday};

    fn friday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap()
    }

    fn sample_series() -> Vec<f64> {
        (0..120)
            .map(|i| {
                let t = i as f64;
                let jitter = ((i * 7919) % 113) as f64 / 113.0 - 0.5;
                50.0 + 0.2 * t + 1.5 * (t * 0.7).sin() + jitter
            })
            .collect()
    }

    #[test]
    fn white_noise_forecast_is_flat() {
        let y = vec![2.0, 4.0, 3.0, 5.0, 6.0, 4.0];
        let model = fit_arima(&y, ArimaOrder::from_usize(0, 0, 0), &EstimatorConfig::default())
            .unwrap();
        let fc = forecast(&model, friday(), 4).unwrap();
        assert_eq!(fc.horizon(), 4);
        for v in fc.values() {
            assert_relative_eq!(*v, 4.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn random_walk_with_drift_forecast() {
        // ARIMA(0,1,0) with intercept: last value plus mean step
        let y = vec![10.0, 11.0, 13.0, 14.0, 16.0];
        let model = fit_arima(&y, ArimaOrder::from_usize(0, 1, 0), &EstimatorConfig::default())
            .unwrap();
        let values = forecast_values(&model, 3);
        assert_relative_eq!(values[0], 17.5, epsilon = 1e-10);
        assert_relative_eq!(values[1], 19.0, epsilon = 1e-10);
        assert_relative_eq!(values[2], 20.5, epsilon = 1e-10);
    }

    #[test]
    fn integrated_forecast_without_trend_has_no_drift() {
        let y = vec![10.0, 11.0, 13.0, 14.0, 16.0];
        let config = EstimatorConfig::default().with_trend(Trend::None);
        let model = fit_arima(&y, ArimaOrder::from_usize(0, 1, 0), &config).unwrap();
        assert_eq!(model.intercept(), 0.0);
        for v in forecast_values(&model, 3) {
            assert_eq!(v, 16.0);
        }
    }

    #[test]
    fn timestamps_skip_weekend() {
        let model = fit_arima(
            &sample_series(),
            ArimaOrder::from_usize(1, 1, 0),
            &EstimatorConfig::default(),
        )
        .unwrap();
        let fc = forecast(&model, friday(), 6).unwrap();
        let days: Vec<Weekday> = fc.timestamps().iter().map(|t| t.weekday()).collect();
        assert_eq!(
            days,
            vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Mon
            ]
        );
    }

    #[test]
    fn zero_horizon_rejected() {
        let model = fit_arima(
            &sample_series(),
            ArimaOrder::from_usize(0, 1, 1),
            &EstimatorConfig::default(),
        )
        .unwrap();
        assert_eq!(
            forecast(&model, friday(), 0),
            Err(ForecastError::ForecastHorizon { horizon: 0 })
        );
    }

    #[test]
    fn intervals_widen_with_horizon() {
        let model = fit_arima(
            &sample_series(),
            ArimaOrder::from_usize(1, 1, 1),
            &EstimatorConfig::default(),
        )
        .unwrap();
        let fc = forecast_with_intervals(&model, friday(), 10, 0.95).unwrap();
        let interval = fc.interval().unwrap();
        assert_eq!(interval.level, 0.95);

        let widths: Vec<f64> = interval
            .upper
            .iter()
            .zip(&interval.lower)
            .map(|(u, l)| u - l)
            .collect();
        for w in widths.windows(2) {
            assert!(w[1] >= w[0] - 1e-12);
        }
        for ((l, v), u) in interval.lower.iter().zip(fc.values()).zip(&interval.upper) {
            assert!(l < v && v < u);
        }

        // One-step half-width is z * sigma
        let half = (interval.upper[0] - interval.lower[0]) / 2.0;
        assert_relative_eq!(half, 1.959964 * model.sigma2().sqrt(), max_relative = 1e-5);
    }

    #[test]
    fn interval_level_validated() {
        let model = fit_arima(
            &sample_series(),
            ArimaOrder::from_usize(1, 0, 0),
            &EstimatorConfig::default(),
        )
        .unwrap();
        for level in [0.0, 1.0, -0.5, f64::NAN] {
            assert!(matches!(
                forecast_with_intervals(&model, friday(), 3, level),
                Err(ForecastError::InvalidParameter(_))
            ));
        }
    }
}
