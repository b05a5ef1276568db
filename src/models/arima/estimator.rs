//! Exact maximum-likelihood estimation of ARMA(p, q) coefficients.
//!
//! The search runs over `(μ, φ, θ)` with σ² concentrated out, starting from
//! Hannan–Rissanen estimates. Reported coefficients use the intercept form
//! `c = μ(1 - Σφ)`, and standard errors come from the observed information of
//! the full likelihood over `(c, φ, θ, σ²)`.

use super::diff::{difference, Differenced};
use super::initial::{hannan_rissanen, StartValues};
use super::likelihood::{filter, FilterSums, Initialization};
use super::order::ArimaOrder;
use super::polynomial::{is_invertible, is_stationary};
use crate::error::{ForecastError, Result};
use crate::utils::cancel::CancellationToken;
use crate::utils::linalg::invert_spd;
use crate::utils::numdiff::{hessian_step, hessian_with_steps};
use crate::utils::optimization::{
    bfgs, nelder_mead, BfgsConfig, NelderMeadConfig, OptimizationResult,
};
use crate::utils::stats::mean;
use std::fmt;
use tracing::{debug, warn};

/// Deterministic trend term of the ARMA equation.
///
/// The intercept sits on the differenced scale, so for `d >= 1` it is a
/// drift and the integrated forecast trends linearly. statsmodels' `ARIMA`
/// drops the constant whenever `d >= 1`; use [`Trend::None`] to reproduce
/// its forecasts for integrated models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trend {
    /// Estimate an intercept `c`.
    #[default]
    Constant,
    /// Fix `c = 0`.
    None,
}

/// Configuration for [`ArmaEstimator`].
#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    /// Whether an intercept is estimated.
    pub trend: Trend,
    /// Reject AR coefficients outside the stationary region.
    pub enforce_stationarity: bool,
    /// Reject MA coefficients outside the invertible region.
    pub enforce_invertibility: bool,
    /// Quasi-Newton settings.
    pub bfgs: BfgsConfig,
    /// Retry with Nelder-Mead from the BFGS point if BFGS did not converge.
    pub fallback_to_nelder_mead: bool,
    /// Simplex settings for the fallback.
    pub nelder_mead: NelderMeadConfig,
    /// Cooperative cancellation flag.
    pub cancel: Option<CancellationToken>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            trend: Trend::Constant,
            enforce_stationarity: false,
            enforce_invertibility: false,
            bfgs: BfgsConfig::default(),
            fallback_to_nelder_mead: true,
            nelder_mead: NelderMeadConfig::default(),
            cancel: None,
        }
    }
}

impl EstimatorConfig {
    /// Set the trend term.
    pub fn with_trend(mut self, trend: Trend) -> Self {
        self.trend = trend;
        self
    }

    /// Restrict the search to stationary AR coefficients.
    pub fn with_enforce_stationarity(mut self, enforce: bool) -> Self {
        self.enforce_stationarity = enforce;
        self
    }

    /// Restrict the search to invertible MA coefficients.
    pub fn with_enforce_invertibility(mut self, enforce: bool) -> Self {
        self.enforce_invertibility = enforce;
        self
    }

    /// Replace the BFGS settings.
    pub fn with_bfgs(mut self, bfgs: BfgsConfig) -> Self {
        self.bfgs = bfgs;
        self
    }

    /// Enable or disable the Nelder-Mead fallback.
    pub fn with_fallback_to_nelder_mead(mut self, fallback: bool) -> Self {
        self.fallback_to_nelder_mead = fallback;
        self
    }

    /// Replace the Nelder-Mead settings.
    pub fn with_nelder_mead(mut self, nelder_mead: NelderMeadConfig) -> Self {
        self.nelder_mead = nelder_mead;
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn has_intercept(&self) -> bool {
        self.trend == Trend::Constant
    }
}

/// Optimizer that produced the final coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimationMethod {
    /// White noise: sample moments, no search.
    ClosedForm,
    /// Quasi-Newton search converged.
    Bfgs,
    /// Simplex fallback converged after BFGS did not.
    NelderMead,
}

impl fmt::Display for EstimationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimationMethod::ClosedForm => write!(f, "closed form"),
            EstimationMethod::Bfgs => write!(f, "BFGS"),
            EstimationMethod::NelderMead => write!(f, "Nelder-Mead"),
        }
    }
}

/// How the estimate was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationReport {
    /// Optimizer that produced the estimate.
    pub method: EstimationMethod,
    /// Total optimizer iterations across BFGS and the fallback.
    pub iterations: usize,
    /// Initial state distribution of the Kalman filter at the optimum.
    pub initialization: Initialization,
    /// Hannan–Rissanen starting point.
    pub start: StartValues,
}

/// A fitted ARIMA model. Immutable once estimated.
#[derive(Debug, Clone)]
pub struct FittedModel {
    order: ArimaOrder,
    has_intercept: bool,
    intercept: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    sigma2: f64,
    loglik: f64,
    nobs: usize,
    differenced: Vec<f64>,
    seeds: Vec<f64>,
    residuals: Vec<f64>,
    covariance: Option<Vec<Vec<f64>>>,
    report: EstimationReport,
}

impl FittedModel {
    /// Model order.
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Whether the intercept was estimated (as opposed to fixed at zero).
    pub fn has_intercept(&self) -> bool {
        self.has_intercept
    }

    /// Intercept `c` of the ARMA equation on the differenced scale.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Unconditional mean `c / (1 - Σφ)` of the differenced series.
    ///
    /// `None` when the AR polynomial has a unit root at one.
    pub fn mean(&self) -> Option<f64> {
        let denom = 1.0 - self.ar.iter().sum::<f64>();
        if denom.abs() < 1e-12 {
            None
        } else {
            Some(self.intercept / denom)
        }
    }

    /// AR coefficients φ₁..φp.
    pub fn ar(&self) -> &[f64] {
        &self.ar
    }

    /// MA coefficients θ₁..θq.
    pub fn ma(&self) -> &[f64] {
        &self.ma
    }

    /// Innovation variance σ².
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Log-likelihood at the optimum.
    pub fn loglik(&self) -> f64 {
        self.loglik
    }

    /// Number of observations entering the likelihood.
    pub fn nobs(&self) -> usize {
        self.nobs
    }

    /// The differenced series the model was fitted to.
    pub fn differenced(&self) -> &[f64] {
        &self.differenced
    }

    /// Seeds needed to integrate forecasts back to the original scale.
    pub fn seeds(&self) -> &[f64] {
        &self.seeds
    }

    /// Conditional residuals, aligned with the last
    /// `len(differenced) - max(p, q)` differenced observations.
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// One-step in-sample predictions on the differenced scale, aligned like
    /// [`FittedModel::residuals`].
    pub fn fitted_values(&self) -> Vec<f64> {
        let offset = self.differenced.len() - self.residuals.len();
        self.differenced[offset..]
            .iter()
            .zip(&self.residuals)
            .map(|(y, e)| y - e)
            .collect()
    }

    /// Covariance of [`FittedModel::params`], if the observed information
    /// was positive definite.
    pub fn covariance(&self) -> Option<&[Vec<f64>]> {
        self.covariance.as_deref()
    }

    /// Standard errors of [`FittedModel::params`].
    pub fn std_errors(&self) -> Option<Vec<f64>> {
        self.covariance
            .as_ref()
            .map(|cov| (0..cov.len()).map(|i| cov[i][i].sqrt()).collect())
    }

    /// How the estimate was obtained.
    pub fn report(&self) -> &EstimationReport {
        &self.report
    }

    /// Whether the AR polynomial has all roots outside the unit circle.
    pub fn is_stationary(&self) -> bool {
        is_stationary(&self.ar)
    }

    /// Whether the MA polynomial has all roots outside the unit circle.
    pub fn is_invertible(&self) -> bool {
        is_invertible(&self.ma)
    }

    /// Parameter names in reporting order: `const`, `ar.L*`, `ma.L*`, `sigma2`.
    pub fn param_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.num_params());
        if self.has_intercept {
            names.push("const".to_string());
        }
        names.extend((1..=self.ar.len()).map(|i| format!("ar.L{i}")));
        names.extend((1..=self.ma.len()).map(|i| format!("ma.L{i}")));
        names.push("sigma2".to_string());
        names
    }

    /// Parameter values in the order of [`FittedModel::param_names`].
    pub fn params(&self) -> Vec<f64> {
        let mut params = Vec::with_capacity(self.num_params());
        if self.has_intercept {
            params.push(self.intercept);
        }
        params.extend_from_slice(&self.ar);
        params.extend_from_slice(&self.ma);
        params.push(self.sigma2);
        params
    }

    /// Number of estimated parameters, σ² included.
    pub fn num_params(&self) -> usize {
        self.order.num_arma_params() + 1 + usize::from(self.has_intercept)
    }
}

/// Conditional residuals with zero presample innovations, from `t = max(p, q)`.
pub fn conditional_residuals(y: &[f64], intercept: f64, ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let start = ar.len().max(ma.len());
    let n = y.len();
    let mut eps = vec![0.0; n];

    for t in start..n {
        let mut pred = intercept;
        for (i, phi) in ar.iter().enumerate() {
            pred += phi * y[t - 1 - i];
        }
        for (j, theta) in ma.iter().enumerate() {
            pred += theta * eps[t - 1 - j];
        }
        eps[t] = y[t] - pred;
    }

    eps.split_off(start.min(n))
}

/// Split a search vector `[μ?, φ.., θ..]` into `(c, φ, θ)`.
fn unpack(x: &[f64], p: usize, has_intercept: bool) -> (f64, &[f64], &[f64]) {
    let offset = usize::from(has_intercept);
    let ar = &x[offset..offset + p];
    let ma = &x[offset + p..];
    let mu = if has_intercept { x[0] } else { 0.0 };
    let intercept = mu * (1.0 - ar.iter().sum::<f64>());
    (intercept, ar, ma)
}

/// ARMA maximum-likelihood estimator.
///
/// # Example
/// ```
/// use arima_forecast::models::arima::{difference, ArimaOrder, ArmaEstimator};
///
/// let prices: Vec<f64> = (0..80)
///     .map(|i| 100.0 + 0.3 * i as f64 + (i as f64 * 0.9).sin())
///     .collect();
/// let diff = difference(&prices, 1).unwrap();
/// let model = ArmaEstimator::default()
///     .fit(&diff, ArimaOrder::from_usize(1, 1, 0))
///     .unwrap();
/// assert_eq!(model.ar().len(), 1);
/// assert!(model.sigma2() > 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArmaEstimator {
    config: EstimatorConfig,
}

impl ArmaEstimator {
    /// Create an estimator with the given configuration.
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Estimator configuration.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.config.cancel {
            Some(token) if token.is_cancelled() => Err(ForecastError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Estimate an ARMA(p, q) on a series differenced `order.d` times.
    ///
    /// # Errors
    /// - [`ForecastError::DimensionMismatch`] if `differenced` was produced
    ///   with a different `d`
    /// - [`ForecastError::UnderdeterminedModel`] if `p + q >= len(differenced)`
    /// - [`ForecastError::EstimationDiverged`] if no optimizer converged
    /// - [`ForecastError::Cancelled`] if the token fired during the search
    pub fn fit(&self, differenced: &Differenced, order: ArimaOrder) -> Result<FittedModel> {
        if differenced.order() != order.d {
            return Err(ForecastError::DimensionMismatch {
                expected: order.d,
                got: differenced.order(),
            });
        }

        let y = &differenced.values;
        let n = y.len();
        if n == 0 {
            return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
        }
        if order.num_arma_params() >= n {
            return Err(ForecastError::UnderdeterminedModel {
                p: order.p,
                q: order.q,
                n,
            });
        }
        self.check_cancelled()?;

        let has_intercept = self.config.has_intercept();
        debug!(%order, n, has_intercept, "fitting ARMA model");

        if order.num_arma_params() == 0 {
            return self.fit_white_noise(differenced, order);
        }

        let start = hannan_rissanen(y, order.p, order.q, has_intercept);
        debug!(mean = start.mean, ar = ?start.ar, ma = ?start.ma, "start values");

        let p = order.p;
        let enforce_stationarity = self.config.enforce_stationarity;
        let enforce_invertibility = self.config.enforce_invertibility;
        let objective = |x: &[f64]| -> f64 {
            let (intercept, ar, ma) = unpack(x, p, has_intercept);
            if enforce_stationarity && !is_stationary(ar) {
                return f64::INFINITY;
            }
            if enforce_invertibility && !is_invertible(ma) {
                return f64::INFINITY;
            }
            match filter(y, intercept, ar, ma) {
                Some(sums) if sums.sum_sq > 0.0 => {
                    -sums.concentrated_loglik() / sums.nobs as f64
                }
                _ => f64::INFINITY,
            }
        };

        let mut x0: Vec<f64> = Vec::with_capacity(order.num_arma_params() + 1);
        if has_intercept {
            x0.push(start.mean);
        }
        x0.extend_from_slice(&start.ar);
        x0.extend_from_slice(&start.ma);
        if !objective(&x0).is_finite() {
            debug!("start values infeasible, restarting from zero coefficients");
            for v in x0.iter_mut().skip(usize::from(has_intercept)) {
                *v = 0.0;
            }
        }

        let cancel = self.config.cancel.as_ref();
        let primary = bfgs(&objective, &x0, &self.config.bfgs, cancel)?;
        debug!(
            iterations = primary.iterations,
            converged = primary.converged,
            value = primary.optimal_value,
            "bfgs finished"
        );

        let (best, method, iterations) = if primary.converged {
            let iterations = primary.iterations;
            (primary, EstimationMethod::Bfgs, iterations)
        } else if self.config.fallback_to_nelder_mead {
            warn!(%order, "bfgs did not converge, falling back to Nelder-Mead");
            let retry = nelder_mead(
                &objective,
                &primary.optimal_point,
                &self.config.nelder_mead,
                cancel,
            )?;
            let iterations = primary.iterations + retry.iterations;
            let best = pick_better(primary, retry);
            (best, EstimationMethod::NelderMead, iterations)
        } else {
            let iterations = primary.iterations;
            (primary, EstimationMethod::Bfgs, iterations)
        };

        if !best.converged || !best.optimal_value.is_finite() {
            let (intercept, ar, ma) = unpack(&best.optimal_point, p, has_intercept);
            let mut params = Vec::with_capacity(best.optimal_point.len());
            if has_intercept {
                params.push(intercept);
            }
            params.extend_from_slice(ar);
            params.extend_from_slice(ma);
            let loglik = filter(y, intercept, ar, ma)
                .map(|sums| sums.concentrated_loglik())
                .unwrap_or(f64::NEG_INFINITY);
            warn!(%order, iterations, loglik, "estimation did not converge");
            return Err(ForecastError::EstimationDiverged {
                order,
                iterations,
                loglik,
                params,
            });
        }

        let (intercept, ar, ma) = unpack(&best.optimal_point, p, has_intercept);
        let sums = filter(y, intercept, ar, ma).ok_or_else(|| {
            ForecastError::ComputationError("Kalman filter failed at the optimum".into())
        })?;
        let sigma2 = sums.sigma2();
        if !(sigma2.is_finite() && sigma2 > 0.0) {
            return Err(ForecastError::ComputationError(
                "zero innovation variance".into(),
            ));
        }

        let covariance = observed_covariance(y, intercept, ar, ma, sigma2, has_intercept);
        if covariance.is_none() {
            debug!(%order, "observed information not positive definite");
        }

        let model = FittedModel {
            order,
            has_intercept,
            intercept,
            ar: ar.to_vec(),
            ma: ma.to_vec(),
            sigma2,
            loglik: sums.concentrated_loglik(),
            nobs: sums.nobs,
            differenced: y.clone(),
            seeds: differenced.seeds.clone(),
            residuals: conditional_residuals(y, intercept, ar, ma),
            covariance,
            report: EstimationReport {
                method,
                iterations,
                initialization: sums.initialization,
                start,
            },
        };
        debug!(
            %order,
            loglik = model.loglik,
            sigma2 = model.sigma2,
            method = %method,
            "ARMA model fitted"
        );
        Ok(model)
    }

    fn fit_white_noise(&self, differenced: &Differenced, order: ArimaOrder) -> Result<FittedModel> {
        let y = &differenced.values;
        let has_intercept = self.config.has_intercept();
        let intercept = if has_intercept { mean(y) } else { 0.0 };

        let sums: FilterSums = filter(y, intercept, &[], &[]).ok_or_else(|| {
            ForecastError::ComputationError("Kalman filter failed for white noise".into())
        })?;
        let sigma2 = sums.sigma2();
        if !(sigma2.is_finite() && sigma2 > 0.0) {
            return Err(ForecastError::ComputationError(
                "zero innovation variance".into(),
            ));
        }

        let covariance = observed_covariance(y, intercept, &[], &[], sigma2, has_intercept);

        Ok(FittedModel {
            order,
            has_intercept,
            intercept,
            ar: vec![],
            ma: vec![],
            sigma2,
            loglik: sums.concentrated_loglik(),
            nobs: sums.nobs,
            differenced: y.clone(),
            seeds: differenced.seeds.clone(),
            residuals: conditional_residuals(y, intercept, &[], &[]),
            covariance,
            report: EstimationReport {
                method: EstimationMethod::ClosedForm,
                iterations: 0,
                initialization: sums.initialization,
                start: StartValues {
                    mean: intercept,
                    ar: vec![],
                    ma: vec![],
                },
            },
        })
    }
}

fn pick_better(a: OptimizationResult, b: OptimizationResult) -> OptimizationResult {
    match (a.converged, b.converged) {
        (false, true) => b,
        (true, false) => a,
        _ if b.optimal_value < a.optimal_value => b,
        _ => a,
    }
}

/// Inverse of the negated numerical Hessian of the full log-likelihood over
/// `(c?, φ, θ, σ²)`. `None` if it is not positive definite.
fn observed_covariance(
    y: &[f64],
    intercept: f64,
    ar: &[f64],
    ma: &[f64],
    sigma2: f64,
    has_intercept: bool,
) -> Option<Vec<Vec<f64>>> {
    let p = ar.len();
    let offset = usize::from(has_intercept);

    let mut theta: Vec<f64> = Vec::with_capacity(offset + p + ma.len() + 1);
    if has_intercept {
        theta.push(intercept);
    }
    theta.extend_from_slice(ar);
    theta.extend_from_slice(ma);
    theta.push(sigma2);

    let last = theta.len() - 1;
    let neg_loglik = |x: &[f64]| -> f64 {
        let c = if has_intercept { x[0] } else { 0.0 };
        let ar = &x[offset..offset + p];
        let ma = &x[offset + p..last];
        match filter(y, c, ar, ma) {
            Some(sums) => -sums.loglik(x[last]),
            None => f64::INFINITY,
        }
    };

    let mut steps: Vec<f64> = theta.iter().map(|&v| hessian_step(v)).collect();
    steps[last] = 1e-3 * sigma2;

    let info = hessian_with_steps(&neg_loglik, &theta, &steps);
    if info.iter().flatten().any(|v| !v.is_finite()) {
        return None;
    }

    let cov = invert_spd(&info)?;
    if (0..cov.len()).any(|i| cov[i][i] <= 0.0 || !cov[i][i].is_finite()) {
        return None;
    }
    Some(cov)
}

/// Estimate an ARMA(p, q) on an already differenced series.
pub fn estimate(
    differenced: &Differenced,
    order: ArimaOrder,
    config: &EstimatorConfig,
) -> Result<FittedModel> {
    ArmaEstimator::new(config.clone()).fit(differenced, order)
}

/// Difference `values` `order.d` times and estimate the ARMA part.
pub fn fit_arima(values: &[f64], order: ArimaOrder, config: &EstimatorConfig) -> Result<FittedModel> {
    if values.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    let differenced = difference(values, order.d)?;
    estimate(&differenced, order, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lcg_noise(n: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                // Sum of uniforms, roughly normal with unit variance
                let mut acc = 0.0;
                for _ in 0..12 {
                    state = state
                        .wrapping_mul(6364136223846793005)
                        .wrapping_add(1442695040888963407);
                    acc += (state >> 11) as f64 / (1u64 << 53) as f64;
                }
                acc - 6.0
            })
            .collect()
    }

    fn simulate_ar1(n: usize, c: f64, phi: f64, seed: u64) -> Vec<f64> {
        let noise = lcg_noise(n + 100, seed);
        let mut y = vec![c / (1.0 - phi)];
        for e in noise.iter().skip(1) {
            let prev = y[y.len() - 1];
            y.push(c + phi * prev + e);
        }
        y.split_off(100)
    }

    #[test]
    fn white_noise_closed_form() {
        let y = vec![1.0, 3.0, 2.0, 4.0, 5.0];
        let diff = difference(&y, 0).unwrap();
        let model = ArmaEstimator::default()
            .fit(&diff, ArimaOrder::from_usize(0, 0, 0))
            .unwrap();

        assert_eq!(model.report().method, EstimationMethod::ClosedForm);
        assert_relative_eq!(model.intercept(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(model.sigma2(), 2.0, epsilon = 1e-12);
        assert_eq!(model.nobs(), 5);
        assert_eq!(model.residuals().len(), 5);

        let expected = -2.5 * ((2.0 * std::f64::consts::PI).ln() + 2.0_f64.ln() + 1.0);
        assert_relative_eq!(model.loglik(), expected, epsilon = 1e-10);
    }

    #[test]
    fn white_noise_standard_errors() {
        // SE(mean) = sqrt(σ²/n), SE(σ²) = σ² sqrt(2/n)
        let y: Vec<f64> = lcg_noise(400, 7);
        let diff = difference(&y, 0).unwrap();
        let model = ArmaEstimator::default()
            .fit(&diff, ArimaOrder::from_usize(0, 0, 0))
            .unwrap();
        let se = model.std_errors().unwrap();
        let n = 400.0;
        assert_relative_eq!(se[0], (model.sigma2() / n).sqrt(), max_relative = 1e-3);
        assert_relative_eq!(se[1], model.sigma2() * (2.0 / n).sqrt(), max_relative = 1e-3);
    }

    #[test]
    fn ar1_estimate_is_close() {
        let y = simulate_ar1(600, 1.0, 0.5, 42);
        let diff = difference(&y, 0).unwrap();
        let model = ArmaEstimator::default()
            .fit(&diff, ArimaOrder::from_usize(1, 0, 0))
            .unwrap();

        assert!((model.ar()[0] - 0.5).abs() < 0.1, "phi = {}", model.ar()[0]);
        let mu = model.mean().unwrap();
        assert!((mu - 2.0).abs() < 0.3, "mean = {mu}");
        assert!(model.is_stationary());
        assert_eq!(model.residuals().len(), 599);
        assert_eq!(model.param_names(), vec!["const", "ar.L1", "sigma2"]);
        assert_eq!(model.num_params(), 3);
        assert!(model.std_errors().is_some());
    }

    #[test]
    fn no_intercept_trend() {
        let y = simulate_ar1(300, 0.0, 0.4, 3);
        let diff = difference(&y, 0).unwrap();
        let config = EstimatorConfig::default().with_trend(Trend::None);
        let model = estimate(&diff, ArimaOrder::from_usize(1, 0, 0), &config).unwrap();
        assert_eq!(model.intercept(), 0.0);
        assert!(!model.has_intercept());
        assert_eq!(model.param_names(), vec!["ar.L1", "sigma2"]);
    }

    #[test]
    fn nelder_mead_fallback_reaches_the_optimum() {
        // One free parameter, BFGS stopped after a single step
        let y = simulate_ar1(300, 0.0, 0.6, 19);
        let diff = difference(&y, 0).unwrap();
        let base = EstimatorConfig::default().with_trend(Trend::None);
        let reference = estimate(&diff, ArimaOrder::from_usize(1, 0, 0), &base).unwrap();

        let capped = base.clone().with_bfgs(BfgsConfig {
            max_iter: 1,
            tolerance: 0.0,
            gradient_tolerance: 0.0,
            ..BfgsConfig::default()
        });
        let model = estimate(&diff, ArimaOrder::from_usize(1, 0, 0), &capped).unwrap();

        assert_eq!(model.report().method, EstimationMethod::NelderMead);
        assert_relative_eq!(model.ar()[0], reference.ar()[0], epsilon = 1e-3);
        assert_relative_eq!(model.loglik(), reference.loglik(), epsilon = 1e-5);
    }

    #[test]
    fn underdetermined_model_rejected() {
        let diff = difference(&[1.0, 2.0, 4.0, 3.0], 1).unwrap();
        let err = ArmaEstimator::default()
            .fit(&diff, ArimaOrder::from_usize(2, 1, 1))
            .unwrap_err();
        assert_eq!(err, ForecastError::UnderdeterminedModel { p: 2, q: 1, n: 3 });
    }

    #[test]
    fn mismatched_differencing_rejected() {
        let diff = difference(&[1.0, 2.0, 4.0, 3.0, 5.0], 1).unwrap();
        let err = ArmaEstimator::default()
            .fit(&diff, ArimaOrder::from_usize(1, 0, 0))
            .unwrap_err();
        assert!(matches!(err, ForecastError::DimensionMismatch { .. }));
    }

    #[test]
    fn constant_series_has_zero_variance() {
        let diff = difference(&[5.0; 10], 0).unwrap();
        let err = ArmaEstimator::default()
            .fit(&diff, ArimaOrder::from_usize(0, 0, 0))
            .unwrap_err();
        assert!(matches!(err, ForecastError::ComputationError(_)));
    }

    #[test]
    fn cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let config = EstimatorConfig::default().with_cancellation(token);
        let y = simulate_ar1(100, 0.0, 0.5, 1);
        let err = fit_arima(&y, ArimaOrder::from_usize(1, 0, 0), &config).unwrap_err();
        assert_eq!(err, ForecastError::Cancelled);
    }

    #[test]
    fn diverged_when_budget_exhausted() {
        let y = simulate_ar1(200, 0.5, 0.6, 11);
        let config = EstimatorConfig::default()
            .with_bfgs(BfgsConfig::default().with_max_iter(1).with_tolerance(0.0))
            .with_fallback_to_nelder_mead(false);
        let config = EstimatorConfig {
            bfgs: BfgsConfig {
                gradient_tolerance: 0.0,
                ..config.bfgs.clone()
            },
            ..config
        };
        match fit_arima(&y, ArimaOrder::from_usize(1, 0, 1), &config) {
            Err(ForecastError::EstimationDiverged {
                order,
                iterations,
                params,
                ..
            }) => {
                assert_eq!(order, ArimaOrder::from_usize(1, 0, 1));
                assert_eq!(iterations, 1);
                assert_eq!(params.len(), 3);
            }
            other => panic!("expected divergence, got {other:?}"),
        }
    }

    #[test]
    fn conditional_residuals_ar1() {
        let y = [1.0, 2.0, 1.5, 0.5];
        let res = conditional_residuals(&y, 0.5, &[0.5], &[]);
        assert_eq!(res.len(), 3);
        assert_relative_eq!(res[0], 2.0 - 0.5 - 0.5, epsilon = 1e-12);
        assert_relative_eq!(res[1], 1.5 - 0.5 - 1.0, epsilon = 1e-12);
        assert_relative_eq!(res[2], 0.5 - 0.5 - 0.75, epsilon = 1e-12);
    }

    #[test]
    fn fitted_values_plus_residuals_reproduce_tail() {
        let y = simulate_ar1(120, 0.2, 0.3, 5);
        let model = fit_arima(&y, ArimaOrder::from_usize(1, 0, 1), &EstimatorConfig::default())
            .unwrap();
        let fitted = model.fitted_values();
        let offset = y.len() - fitted.len();
        for (i, (f, e)) in fitted.iter().zip(model.residuals()).enumerate() {
            assert_relative_eq!(f + e, y[offset + i], epsilon = 1e-10);
        }
    }
}
