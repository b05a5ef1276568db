//! Coefficient tables, information criteria and residual checks for a
//! fitted ARIMA model.

use super::estimator::{EstimationMethod, FittedModel};
use super::likelihood::Initialization;
use super::order::ArimaOrder;
use crate::utils::stats::{normal_two_sided_p, quantile_normal};
use crate::validation::{
    heteroskedasticity, jarque_bera, ljung_box, HeteroskedasticityResult, JarqueBeraResult,
    LjungBoxResult,
};
use std::fmt;

/// Akaike information criterion `-2 logL + 2k`.
pub fn aic(loglik: f64, k: usize) -> f64 {
    -2.0 * loglik + 2.0 * k as f64
}

/// Bayesian information criterion `-2 logL + k ln n`.
pub fn bic(loglik: f64, k: usize, n: usize) -> f64 {
    -2.0 * loglik + k as f64 * (n as f64).ln()
}

/// Hannan-Quinn information criterion `-2 logL + 2k ln ln n`.
pub fn hqic(loglik: f64, k: usize, n: usize) -> f64 {
    -2.0 * loglik + 2.0 * k as f64 * (n as f64).ln().ln()
}

/// Configuration for [`summarize_with`].
#[derive(Debug, Clone)]
pub struct DiagnosticsConfig {
    /// Lags at which the Ljung-Box test is reported.
    pub ljung_box_lags: Vec<usize>,
    /// Significance level of the coefficient confidence intervals.
    pub alpha: f64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            ljung_box_lags: vec![1],
            alpha: 0.05,
        }
    }
}

impl DiagnosticsConfig {
    /// Set the Ljung-Box lags.
    pub fn with_ljung_box_lags(mut self, lags: Vec<usize>) -> Self {
        self.ljung_box_lags = lags;
        self
    }

    /// Set the confidence interval significance level.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
}

/// One row of the coefficient table.
///
/// Inference columns are `None` when the observed information matrix was not
/// positive definite.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientRow {
    pub name: String,
    pub estimate: f64,
    pub std_err: Option<f64>,
    pub z: Option<f64>,
    pub p_value: Option<f64>,
    pub conf_int: Option<(f64, f64)>,
}

/// Residual checks reported alongside the coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidualDiagnostics {
    pub ljung_box: Vec<LjungBoxResult>,
    pub jarque_bera: JarqueBeraResult,
    pub heteroskedasticity: HeteroskedasticityResult,
}

/// Summary of a fitted model.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticsReport {
    pub order: ArimaOrder,
    pub nobs: usize,
    pub num_params: usize,
    pub coefficients: Vec<CoefficientRow>,
    pub loglik: f64,
    pub aic: f64,
    pub bic: f64,
    pub hqic: f64,
    pub sigma2: f64,
    pub method: EstimationMethod,
    pub iterations: usize,
    pub initialization: Initialization,
    pub is_stationary: bool,
    pub is_invertible: bool,
    pub residuals: ResidualDiagnostics,
    alpha: f64,
}

impl DiagnosticsReport {
    /// Look up a coefficient row by name (`const`, `ar.L1`, `sigma2`, ...).
    pub fn coefficient(&self, name: &str) -> Option<&CoefficientRow> {
        self.coefficients.iter().find(|row| row.name == name)
    }

    /// Whether standard errors could be computed.
    pub fn has_standard_errors(&self) -> bool {
        self.coefficients.iter().all(|row| row.std_err.is_some())
    }
}

/// Summarize a fitted model with the default configuration.
pub fn summarize(model: &FittedModel) -> DiagnosticsReport {
    summarize_with(model, &DiagnosticsConfig::default())
}

/// Summarize a fitted model.
pub fn summarize_with(model: &FittedModel, config: &DiagnosticsConfig) -> DiagnosticsReport {
    let names = model.param_names();
    let params = model.params();
    let std_errors = model.std_errors();
    let z_crit = quantile_normal(1.0 - config.alpha / 2.0);

    let coefficients = names
        .into_iter()
        .zip(params)
        .enumerate()
        .map(|(i, (name, estimate))| {
            let std_err = std_errors.as_ref().map(|se| se[i]);
            let z = std_err.map(|se| estimate / se);
            CoefficientRow {
                name,
                estimate,
                std_err,
                z,
                p_value: z.map(normal_two_sided_p),
                conf_int: std_err.map(|se| (estimate - z_crit * se, estimate + z_crit * se)),
            }
        })
        .collect();

    let k = model.num_params();
    let n = model.nobs();
    let loglik = model.loglik();
    let residuals = model.residuals();

    let report = model.report();
    DiagnosticsReport {
        order: model.order(),
        nobs: n,
        num_params: k,
        coefficients,
        loglik,
        aic: aic(loglik, k),
        bic: bic(loglik, k, n),
        hqic: hqic(loglik, k, n),
        sigma2: model.sigma2(),
        method: report.method,
        iterations: report.iterations,
        initialization: report.initialization,
        is_stationary: model.is_stationary(),
        is_invertible: model.is_invertible(),
        residuals: ResidualDiagnostics {
            ljung_box: config
                .ljung_box_lags
                .iter()
                .map(|&lag| ljung_box(residuals, Some(lag), 0))
                .collect(),
            jarque_bera: jarque_bera(residuals),
            heteroskedasticity: heteroskedasticity(residuals),
        },
        alpha: config.alpha,
    }
}

fn cell(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "-".to_string(),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

const WIDTH: usize = 78;

impl fmt::Display for DiagnosticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let double = "=".repeat(WIDTH);
        let single = "-".repeat(WIDTH);
        let model = format!("ARIMA{}", self.order);

        writeln!(f, "{:^width$}", "ARIMA Model Results", width = WIDTH)?;
        writeln!(f, "{double}")?;
        writeln!(f, "{:<20}{:>18}   {:<20}{:>17.3}", "Model:", model, "Log Likelihood", self.loglik)?;
        writeln!(f, "{:<20}{:>18}   {:<20}{:>17.3}", "No. Observations:", self.nobs, "AIC", self.aic)?;
        writeln!(
            f,
            "{:<20}{:>18}   {:<20}{:>17.3}",
            "Method:",
            self.method.to_string(),
            "BIC",
            self.bic
        )?;
        writeln!(
            f,
            "{:<20}{:>18}   {:<20}{:>17.3}",
            "Initialization:",
            self.initialization.to_string(),
            "HQIC",
            self.hqic
        )?;
        writeln!(f, "{double}")?;

        let lo = format!("[{:.3}", self.alpha / 2.0);
        let hi = format!("{:.3}]", 1.0 - self.alpha / 2.0);
        writeln!(
            f,
            "{:<12}{:>12}{:>11}{:>10}{:>9}{:>12}{:>12}",
            "", "coef", "std err", "z", "P>|z|", lo, hi
        )?;
        writeln!(f, "{single}")?;
        for row in &self.coefficients {
            let (lower, upper) = match row.conf_int {
                Some((l, u)) => (Some(l), Some(u)),
                None => (None, None),
            };
            writeln!(
                f,
                "{:<12}{:>12.4}{:>11}{:>10}{:>9}{:>12}{:>12}",
                row.name,
                row.estimate,
                cell(row.std_err, 3),
                cell(row.z, 3),
                cell(row.p_value, 3),
                cell(lower, 3),
                cell(upper, 3)
            )?;
        }
        writeln!(f, "{double}")?;

        let jb = &self.residuals.jarque_bera;
        let het = &self.residuals.heteroskedasticity;
        let mut left: Vec<(String, f64)> = Vec::new();
        for lb in &self.residuals.ljung_box {
            left.push((format!("Ljung-Box (L{}) (Q):", lb.lags), lb.statistic));
            left.push(("Prob(Q):".to_string(), lb.p_value));
        }
        left.push(("Heteroskedasticity (H):".to_string(), het.statistic));
        left.push(("Prob(H) (two-sided):".to_string(), het.p_value));
        let right = [
            ("Jarque-Bera (JB):", jb.statistic),
            ("Prob(JB):", jb.p_value),
            ("Skew:", jb.skewness),
            ("Kurtosis:", jb.kurtosis),
        ];

        let rows = left.len().max(right.len());
        for i in 0..rows {
            let l = left
                .get(i)
                .map(|(name, v)| format!("{name:<26}{v:>10.2}"))
                .unwrap_or_else(|| " ".repeat(36));
            let r = right
                .get(i)
                .map(|(name, v)| format!("{name:<26}{v:>13.2}"))
                .unwrap_or_default();
            writeln!(f, "{l}   {r}")?;
        }
        writeln!(f, "{double}")?;
        writeln!(
            f,
            "sigma2: {:.6}   stationary AR: {}   invertible MA: {}   iterations: {}",
            self.sigma2,
            yes_no(self.is_stationary),
            yes_no(self.is_invertible),
            self.iterations
        )?;
        if !self.has_standard_errors() {
            writeln!(
                f,
                "Standard errors are undefined: the observed information matrix is not positive definite."
            )?;
        }
        Ok(())
    }
}
