//! Conditional least-squares start values (Hannan–Rissanen).

use super::polynomial::{is_invertible, is_stationary};
use crate::utils::ols::ols_fit;
use crate::utils::stats::mean;
use tracing::debug;

/// Starting point for the likelihood search.
#[derive(Debug, Clone, PartialEq)]
pub struct StartValues {
    /// Process mean μ (0 when no intercept is estimated).
    pub mean: f64,
    /// AR coefficients.
    pub ar: Vec<f64>,
    /// MA coefficients.
    pub ma: Vec<f64>,
}

impl StartValues {
    fn zeros(mean: f64, p: usize, q: usize) -> Self {
        Self {
            mean,
            ar: vec![0.0; p],
            ma: vec![0.0; q],
        }
    }
}

/// Regressor columns `y_{t-1-i}` for `t` in `start..n`.
fn lag_columns(y: &[f64], lags: usize, start: usize) -> Vec<Vec<f64>> {
    (0..lags)
        .map(|i| (start..y.len()).map(|t| y[t - 1 - i]).collect())
        .collect()
}

/// Order of the long autoregression used to proxy the innovations.
fn long_ar_order(n: usize, p: usize, q: usize) -> usize {
    let ln_n = (n as f64).ln();
    let by_length = (ln_n * ln_n).floor() as usize;
    by_length.max(2 * p.max(q)).max(1)
}

/// Hannan–Rissanen estimates of an ARMA(p, q) on a (differenced) series.
///
/// 1. Fit a long AR(m) by OLS and keep its residuals as innovation proxies.
/// 2. Regress `y_t` on `y_{t-1..t-p}` and the proxies `e_{t-1..t-q}`.
///
/// Falls back to zero coefficients when the series is too short for either
/// regression. A non-stationary AR block or non-invertible MA block is reset
/// to zero. The returned mean is the sample mean, independent of the
/// regression intercept.
pub fn hannan_rissanen(y: &[f64], p: usize, q: usize, with_intercept: bool) -> StartValues {
    let mu = if with_intercept && !y.is_empty() {
        mean(y)
    } else {
        0.0
    };
    if p == 0 && q == 0 {
        return StartValues::zeros(mu, 0, 0);
    }

    let centered: Vec<f64> = y.iter().map(|v| v - mu).collect();
    let n = centered.len();

    // Innovation proxies, aligned so proxies[t] belongs to centered[t]
    let (proxies, first_proxy) = if q > 0 {
        let m = long_ar_order(n, p, q);
        if n <= 2 * m + 1 {
            debug!(n, m, "series too short for long autoregression, using zero start");
            return StartValues::zeros(mu, p, q);
        }
        let columns = lag_columns(&centered, m, m);
        let fit = match ols_fit(&centered[m..], &columns, false) {
            Ok(fit) => fit,
            Err(err) => {
                debug!(%err, "long autoregression failed, using zero start");
                return StartValues::zeros(mu, p, q);
            }
        };
        let residuals = match fit.residuals(&centered[m..], &columns) {
            Ok(r) => r,
            Err(err) => {
                debug!(%err, "long autoregression residuals failed, using zero start");
                return StartValues::zeros(mu, p, q);
            }
        };
        let mut proxies = vec![0.0; n];
        proxies[m..].copy_from_slice(&residuals);
        (proxies, m)
    } else {
        (vec![0.0; n], 0)
    };

    let start = (first_proxy + q).max(p);
    if n <= start + p + q {
        debug!(n, start, "series too short for lagged regression, using zero start");
        return StartValues::zeros(mu, p, q);
    }

    let mut columns = lag_columns(&centered, p, start);
    columns.extend(lag_columns(&proxies, q, start));

    let fit = match ols_fit(&centered[start..], &columns, false) {
        Ok(fit) => fit,
        Err(err) => {
            debug!(%err, "lagged regression failed, using zero start");
            return StartValues::zeros(mu, p, q);
        }
    };

    let mut ar = fit.coefficients[..p].to_vec();
    let mut ma = fit.coefficients[p..].to_vec();

    if !is_stationary(&ar) {
        debug!(?ar, "start AR block is non-stationary, resetting to zero");
        ar = vec![0.0; p];
    }
    if !is_invertible(&ma) {
        debug!(?ma, "start MA block is non-invertible, resetting to zero");
        ma = vec![0.0; q];
    }

    StartValues { mean: mu, ar, ma }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulate_arma(n: usize, c: f64, ar: &[f64], ma: &[f64]) -> Vec<f64> {
        // Deterministic pseudo-noise from a linear congruential generator
        let mut state: u64 = 12345;
        let mut noise = || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 11) as f64 / (1u64 << 53) as f64) - 0.5
        };
        let burn = 200;
        let mut y = vec![0.0; n + burn];
        let mut e = vec![0.0; n + burn];
        for t in 0..n + burn {
            e[t] = noise();
            let mut v = c + e[t];
            for (i, phi) in ar.iter().enumerate() {
                if t > i {
                    v += phi * y[t - 1 - i];
                }
            }
            for (j, theta) in ma.iter().enumerate() {
                if t > j {
                    v += theta * e[t - 1 - j];
                }
            }
            y[t] = v;
        }
        y.split_off(burn)
    }

    #[test]
    fn white_noise_start_is_mean() {
        let y = [1.0, 2.0, 3.0, 4.0];
        let start = hannan_rissanen(&y, 0, 0, true);
        assert_eq!(start.mean, 2.5);
        assert!(start.ar.is_empty() && start.ma.is_empty());

        let start = hannan_rissanen(&y, 0, 0, false);
        assert_eq!(start.mean, 0.0);
    }

    #[test]
    fn recovers_ar1_roughly() {
        let y = simulate_arma(2000, 0.5, &[0.6], &[]);
        let start = hannan_rissanen(&y, 1, 0, true);
        assert!((start.ar[0] - 0.6).abs() < 0.1, "ar = {:?}", start.ar);
        assert!((start.mean - 0.5 / 0.4).abs() < 0.2, "mean = {}", start.mean);
    }

    #[test]
    fn recovers_ma1_roughly() {
        let y = simulate_arma(3000, 0.0, &[], &[0.5]);
        let start = hannan_rissanen(&y, 0, 1, true);
        assert!((start.ma[0] - 0.5).abs() < 0.15, "ma = {:?}", start.ma);
    }

    #[test]
    fn short_series_falls_back_to_zero() {
        let y = [0.1, -0.3, 0.2, 0.5];
        let start = hannan_rissanen(&y, 1, 1, true);
        assert_eq!(start.ar, vec![0.0]);
        assert_eq!(start.ma, vec![0.0]);
    }

    #[test]
    fn start_is_inside_admissible_region() {
        let y = simulate_arma(500, 0.0, &[0.5, 0.2], &[0.3]);
        let start = hannan_rissanen(&y, 2, 1, true);
        assert!(is_stationary(&start.ar));
        assert!(is_invertible(&start.ma));
    }
}
