//! Exact Gaussian likelihood of an ARMA(p, q) process via the Kalman filter.
//!
//! The model `y_t = c + Σ φᵢ y_{t-i} + ε_t + Σ θⱼ ε_{t-j}` is cast in Harvey's
//! state-space form with state dimension `r = max(p, q + 1)`:
//!
//! ```text
//! y_t     = Z α_t,                 Z = (1, 0, …, 0)
//! α_{t+1} = T α_t + d + R ε_{t+1},  d = (c, 0, …, 0), R = (1, θ₁, …, θ_{r-1})
//! ```
//!
//! All covariances are kept in units of σ² so the variance can be
//! concentrated out of the likelihood.

use super::polynomial::is_stationary;
use crate::utils::linalg::solve_linear;
use std::f64::consts::PI;
use std::fmt;

/// Diffuse prior variance used when the AR part is not stationary.
const DIFFUSE_KAPPA: f64 = 1e6;

/// How the initial state distribution was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initialization {
    /// Unconditional mean and covariance of a stationary process.
    Stationary,
    /// Large-variance prior; the first `r` innovations are burned.
    ApproximateDiffuse,
}

impl fmt::Display for Initialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Initialization::Stationary => write!(f, "stationary"),
            Initialization::ApproximateDiffuse => write!(f, "approximate diffuse"),
        }
    }
}

/// Innovation sums accumulated by one filter pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSums {
    /// Σ ln Fₜ over the observations that enter the likelihood.
    pub sum_log_f: f64,
    /// Σ vₜ² / Fₜ over the same observations.
    pub sum_sq: f64,
    /// Number of observations entering the likelihood.
    pub nobs: usize,
    /// Initialization used for the state.
    pub initialization: Initialization,
}

impl FilterSums {
    /// Maximum-likelihood estimate of σ² given the ARMA coefficients.
    pub fn sigma2(&self) -> f64 {
        self.sum_sq / self.nobs as f64
    }

    /// Log-likelihood with σ² concentrated out.
    pub fn concentrated_loglik(&self) -> f64 {
        let n = self.nobs as f64;
        let sigma2 = self.sigma2();
        -0.5 * n * ((2.0 * PI).ln() + sigma2.ln() + 1.0) - 0.5 * self.sum_log_f
    }

    /// Log-likelihood at an explicit innovation variance.
    pub fn loglik(&self, sigma2: f64) -> f64 {
        if sigma2.is_nan() || sigma2 <= 0.0 {
            return f64::NEG_INFINITY;
        }
        let n = self.nobs as f64;
        -0.5 * n * (2.0 * PI).ln()
            - 0.5 * n * sigma2.ln()
            - 0.5 * self.sum_log_f
            - 0.5 * self.sum_sq / sigma2
    }
}

fn transition_matrix(ar: &[f64], r: usize) -> Vec<Vec<f64>> {
    let mut t = vec![vec![0.0; r]; r];
    for (i, row) in t.iter_mut().enumerate() {
        if let Some(&phi) = ar.get(i) {
            row[0] = phi;
        }
        if i + 1 < r {
            row[i + 1] = 1.0;
        }
    }
    t
}

fn selection_vector(ma: &[f64], r: usize) -> Vec<f64> {
    (0..r)
        .map(|j| match j {
            0 => 1.0,
            _ => ma.get(j - 1).copied().unwrap_or(0.0),
        })
        .collect()
}

fn mat_vec(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    m.iter()
        .map(|row| row.iter().zip(v).map(|(a, b)| a * b).sum())
        .collect()
}

/// `T P T' + R R'`
fn propagate(t: &[Vec<f64>], p: &[Vec<f64>], rvec: &[f64]) -> Vec<Vec<f64>> {
    let r = t.len();
    let mut tp = vec![vec![0.0; r]; r];
    for i in 0..r {
        for j in 0..r {
            tp[i][j] = (0..r).map(|k| t[i][k] * p[k][j]).sum();
        }
    }
    let mut out = vec![vec![0.0; r]; r];
    for i in 0..r {
        for j in 0..r {
            out[i][j] = (0..r).map(|k| tp[i][k] * t[j][k]).sum::<f64>() + rvec[i] * rvec[j];
        }
    }
    out
}

/// Unconditional state moments of a stationary process.
///
/// The mean solves `(I - T) a = d`, the covariance solves the discrete
/// Lyapunov equation `P = T P T' + R R'` in vectorized form.
fn stationary_moments(
    t: &[Vec<f64>],
    rvec: &[f64],
    intercept: f64,
) -> Option<(Vec<f64>, Vec<Vec<f64>>)> {
    let r = t.len();

    let i_minus_t: Vec<Vec<f64>> = (0..r)
        .map(|i| {
            (0..r)
                .map(|j| {
                    let identity = if i == j { 1.0 } else { 0.0 };
                    identity - t[i][j]
                })
                .collect()
        })
        .collect();
    let mut d = vec![0.0; r];
    d[0] = intercept;
    let mean = solve_linear(&i_minus_t, &d)?;

    let size = r * r;
    let mut system = vec![vec![0.0; size]; size];
    for i in 0..r {
        for j in 0..r {
            let row = i * r + j;
            for k in 0..r {
                for l in 0..r {
                    system[row][k * r + l] -= t[i][k] * t[j][l];
                }
            }
            system[row][row] += 1.0;
        }
    }
    let rhs: Vec<f64> = (0..size).map(|idx| rvec[idx / r] * rvec[idx % r]).collect();
    let vec_p = solve_linear(&system, &rhs)?;

    let mut cov = vec![vec![0.0; r]; r];
    for i in 0..r {
        for j in 0..r {
            cov[i][j] = 0.5 * (vec_p[i * r + j] + vec_p[j * r + i]);
        }
    }
    if (0..r).any(|i| cov[i][i] <= 0.0 || !cov[i][i].is_finite()) {
        return None;
    }

    Some((mean, cov))
}

/// Run the Kalman filter over `y` and accumulate the innovation sums.
///
/// Returns `None` when the recursion breaks down numerically (a non-positive
/// or non-finite prediction variance) or no observation is left after the
/// diffuse burn-in.
pub fn filter(y: &[f64], intercept: f64, ar: &[f64], ma: &[f64]) -> Option<FilterSums> {
    let r = ar.len().max(ma.len() + 1);
    let t = transition_matrix(ar, r);
    let rvec = selection_vector(ma, r);

    let stationary = if is_stationary(ar) {
        stationary_moments(&t, &rvec, intercept)
    } else {
        None
    };

    let (mut a, mut p, initialization, burn) = match stationary {
        Some((mean, cov)) => (mean, cov, Initialization::Stationary, 0),
        None => {
            let mut cov = vec![vec![0.0; r]; r];
            for (i, row) in cov.iter_mut().enumerate() {
                row[i] = DIFFUSE_KAPPA;
            }
            (vec![0.0; r], cov, Initialization::ApproximateDiffuse, r)
        }
    };

    if y.len() <= burn {
        return None;
    }

    let mut sums = FilterSums {
        sum_log_f: 0.0,
        sum_sq: 0.0,
        nobs: 0,
        initialization,
    };

    for (idx, &obs) in y.iter().enumerate() {
        let v = obs - a[0];
        let f = p[0][0];
        if f <= 0.0 || !f.is_finite() || !v.is_finite() {
            return None;
        }

        if idx >= burn {
            sums.sum_log_f += f.ln();
            sums.sum_sq += v * v / f;
            sums.nobs += 1;
        }

        // Measurement update
        let gain: Vec<f64> = (0..r).map(|i| p[i][0] / f).collect();
        for i in 0..r {
            a[i] += gain[i] * v;
        }
        let first_row = p[0].clone();
        for i in 0..r {
            for j in 0..r {
                p[i][j] -= gain[i] * first_row[j];
            }
        }

        // Time update
        a = mat_vec(&t, &a);
        a[0] += intercept;
        p = propagate(&t, &p, &rvec);
    }

    if sums.sum_sq.is_finite() && sums.sum_log_f.is_finite() {
        Some(sums)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn direct_ar1_loglik(y: &[f64], c: f64, phi: f64, sigma2: f64) -> f64 {
        // Exact AR(1) likelihood: stationary first term plus conditionals
        let mu = c / (1.0 - phi);
        let var0 = sigma2 / (1.0 - phi * phi);
        let mut ll = -0.5 * ((2.0 * PI).ln() + var0.ln() + (y[0] - mu).powi(2) / var0);
        for t in 1..y.len() {
            let e = y[t] - c - phi * y[t - 1];
            ll += -0.5 * ((2.0 * PI).ln() + sigma2.ln() + e * e / sigma2);
        }
        ll
    }

    #[test]
    fn white_noise_matches_closed_form() {
        let y = [1.0, -0.5, 0.3, 2.0, -1.2];
        let c = 0.2;
        let sums = filter(&y, c, &[], &[]).unwrap();
        assert_eq!(sums.nobs, 5);
        assert_eq!(sums.initialization, Initialization::Stationary);
        assert_relative_eq!(sums.sum_log_f, 0.0, epsilon = 1e-12);

        let ss: f64 = y.iter().map(|v| (v - c).powi(2)).sum();
        assert_relative_eq!(sums.sum_sq, ss, epsilon = 1e-12);
        assert_relative_eq!(sums.sigma2(), ss / 5.0, epsilon = 1e-12);
    }

    #[test]
    fn ar1_matches_exact_likelihood() {
        let y = [0.4, 1.1, 0.7, -0.2, 0.5, 1.3, 0.9, 0.1];
        let (c, phi, sigma2) = (0.1, 0.6, 0.8);
        let sums = filter(&y, c, &[phi], &[]).unwrap();
        let expected = direct_ar1_loglik(&y, c, phi, sigma2);
        assert_relative_eq!(sums.loglik(sigma2), expected, epsilon = 1e-9);
    }

    #[test]
    fn ma1_first_prediction_variance() {
        // Var(y_0) = σ²(1 + θ²)
        let theta = 0.5;
        let y = [0.0];
        let sums = filter(&y, 0.0, &[], &[theta]).unwrap();
        assert_relative_eq!(sums.sum_log_f, (1.0 + theta * theta).ln(), epsilon = 1e-10);
    }

    #[test]
    fn concentrated_loglik_is_max_over_sigma2() {
        let y = [0.3, -0.4, 0.8, 1.0, -0.6, 0.2, 0.9];
        let sums = filter(&y, 0.0, &[0.3], &[0.2]).unwrap();
        let s2 = sums.sigma2();
        let at_max = sums.concentrated_loglik();
        assert_relative_eq!(at_max, sums.loglik(s2), epsilon = 1e-10);
        assert!(sums.loglik(s2 * 1.1) < at_max);
        assert!(sums.loglik(s2 * 0.9) < at_max);
    }

    #[test]
    fn non_stationary_ar_uses_diffuse_start() {
        let y = [1.0, 2.0, 3.5, 4.0, 5.5, 6.0];
        let sums = filter(&y, 0.0, &[1.0], &[]).unwrap();
        assert_eq!(sums.initialization, Initialization::ApproximateDiffuse);
        assert_eq!(sums.nobs, y.len() - 1);
        // After the burn-in a random walk predicts the last value
        let ss: f64 = y.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum();
        assert_relative_eq!(sums.sum_sq, ss, max_relative = 1e-4);
    }

    #[test]
    fn too_short_for_burn_in() {
        assert!(filter(&[1.0], 0.0, &[1.0], &[]).is_none());
    }

    #[test]
    fn loglik_rejects_non_positive_variance() {
        let sums = filter(&[0.1, 0.2], 0.0, &[], &[]).unwrap();
        assert_eq!(sums.loglik(0.0), f64::NEG_INFINITY);
    }
}
