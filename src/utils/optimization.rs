//! Optimization utilities for parameter estimation.
//!
//! Both minimizers report whether they met their convergence criteria rather
//! than failing; deciding what an unconverged result means is left to the
//! caller. Cancellation is checked once per iteration.

use crate::error::{ForecastError, Result};
use crate::utils::cancel::CancellationToken;
use crate::utils::numdiff::gradient;
use tracing::trace;

/// Result of a minimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// The best point found.
    pub optimal_point: Vec<f64>,
    /// The objective function value at the best point.
    pub optimal_value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the algorithm converged.
    pub converged: bool,
}

fn check_cancelled(cancel: Option<&CancellationToken>) -> Result<()> {
    match cancel {
        Some(token) if token.is_cancelled() => Err(ForecastError::Cancelled),
        _ => Ok(()),
    }
}

/// Configuration for BFGS optimization.
#[derive(Debug, Clone)]
pub struct BfgsConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Relative objective improvement below which the run has converged.
    pub tolerance: f64,
    /// Gradient infinity-norm below which the run has converged.
    pub gradient_tolerance: f64,
    /// Maximum number of step halvings per line search.
    pub max_line_search: usize,
    /// Armijo sufficient-decrease constant.
    pub armijo: f64,
}

impl Default for BfgsConfig {
    fn default() -> Self {
        Self {
            max_iter: 200,
            tolerance: 1e-8,
            gradient_tolerance: 1e-5,
            max_line_search: 40,
            armijo: 1e-4,
        }
    }
}

impl BfgsConfig {
    /// Set the maximum number of iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the relative improvement tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn identity(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}

/// Minimize `objective` with BFGS using central-difference gradients.
///
/// Converges when the relative objective improvement of an accepted step is
/// at most `tolerance`, or the gradient infinity-norm is at most
/// `gradient_tolerance`. Non-finite objective values are treated as
/// infeasible and rejected by the line search.
///
/// # Example
/// ```
/// use arima_forecast::utils::optimization::{bfgs, BfgsConfig};
///
/// // Minimize (x-2)^2 + (y-3)^2
/// let result = bfgs(
///     |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
///     &[0.0, 0.0],
///     &BfgsConfig::default(),
///     None,
/// )
/// .unwrap();
///
/// assert!(result.converged);
/// assert!((result.optimal_point[0] - 2.0).abs() < 1e-4);
/// assert!((result.optimal_point[1] - 3.0).abs() < 1e-4);
/// ```
pub fn bfgs<F>(
    objective: F,
    initial: &[f64],
    config: &BfgsConfig,
    cancel: Option<&CancellationToken>,
) -> Result<OptimizationResult>
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    let mut x = initial.to_vec();
    let mut fx = objective(&x);

    if n == 0 || !fx.is_finite() {
        return Ok(OptimizationResult {
            optimal_point: x,
            optimal_value: fx,
            iterations: 0,
            converged: n == 0 && fx.is_finite(),
        });
    }

    let mut g = gradient(&objective, &x);
    let mut h_inv = identity(n);
    let mut scaled = false;
    let mut just_reset = true;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        check_cancelled(cancel)?;
        iterations += 1;

        if g.iter().any(|v| !v.is_finite()) {
            break;
        }
        let g_norm = g.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        if g_norm <= config.gradient_tolerance {
            converged = true;
            break;
        }

        // Search direction d = -H g, falling back to steepest descent
        let mut direction: Vec<f64> = h_inv.iter().map(|row| -dot(row, &g)).collect();
        let mut slope = dot(&g, &direction);
        if slope >= 0.0 {
            h_inv = identity(n);
            direction = g.iter().map(|v| -v).collect();
            slope = -dot(&g, &g);
        }

        // Backtracking Armijo line search
        let mut step = 1.0;
        let mut accepted = None;
        for _ in 0..config.max_line_search {
            let candidate: Vec<f64> = x
                .iter()
                .zip(&direction)
                .map(|(xi, di)| xi + step * di)
                .collect();
            let f_candidate = objective(&candidate);
            if f_candidate.is_finite() && f_candidate <= fx + config.armijo * step * slope {
                accepted = Some((candidate, f_candidate));
                break;
            }
            step *= 0.5;
        }

        let Some((x_new, f_new)) = accepted else {
            if just_reset {
                trace!(iterations, fx, "line search failed on steepest descent");
                break;
            }
            // Curvature estimate is stale; retry from steepest descent
            h_inv = identity(n);
            scaled = false;
            just_reset = true;
            continue;
        };
        just_reset = false;

        let g_new = gradient(&objective, &x_new);
        let s: Vec<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
        let y: Vec<f64> = g_new.iter().zip(&g).map(|(a, b)| a - b).collect();

        let improvement = (fx - f_new) / fx.abs().max(f_new.abs()).max(1.0);
        trace!(iterations, f_new, improvement, step, "bfgs step");

        x = x_new;
        fx = f_new;
        g = g_new;

        if improvement <= config.tolerance {
            converged = true;
            break;
        }

        let sy = dot(&s, &y);
        if sy > 1e-12 {
            if !scaled {
                let gamma = sy / dot(&y, &y);
                for (i, row) in h_inv.iter_mut().enumerate() {
                    for (j, v) in row.iter_mut().enumerate() {
                        *v = if i == j { gamma } else { 0.0 };
                    }
                }
                scaled = true;
            }
            let rho = 1.0 / sy;
            let hy: Vec<f64> = h_inv.iter().map(|row| dot(row, &y)).collect();
            let yhy = dot(&y, &hy);
            for i in 0..n {
                for j in 0..n {
                    h_inv[i][j] += -rho * (s[i] * hy[j] + hy[i] * s[j])
                        + (rho * rho * yhy + rho) * s[i] * s[j];
                }
            }
        }
    }

    Ok(OptimizationResult {
        optimal_point: x,
        optimal_value: fx,
        iterations,
        converged,
    })
}

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Tolerance on the spread of objective values across the simplex.
    pub tolerance: f64,
    /// Tolerance on the distance of vertices from the centroid.
    pub x_tolerance: f64,
    /// Reflection coefficient (default: 1.0).
    pub alpha: f64,
    /// Expansion coefficient (default: 2.0).
    pub gamma: f64,
    /// Contraction coefficient (default: 0.5).
    pub rho: f64,
    /// Shrinkage coefficient (default: 0.5).
    pub sigma: f64,
    /// Initial simplex step size (default: 0.05).
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 5000,
            tolerance: 1e-10,
            x_tolerance: 1e-6,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

/// Perform Nelder-Mead simplex optimization.
///
/// # Arguments
/// * `objective` - The objective function to minimize
/// * `initial` - Initial guess for the optimal point
/// * `config` - Configuration parameters
/// * `cancel` - Optional cancellation flag checked every iteration
///
/// # Returns
/// `OptimizationResult` containing the optimal point and convergence information.
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    config: &NelderMeadConfig,
    cancel: Option<&CancellationToken>,
) -> Result<OptimizationResult>
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return Ok(OptimizationResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        });
    }

    // Infeasible points rank last
    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    // Initialize simplex with n+1 vertices
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(initial.to_vec());

    for i in 0..n {
        let mut vertex = initial.to_vec();
        let step = if initial[i].abs() > 1e-10 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        vertex[i] += step;
        simplex.push(vertex);
    }

    let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        check_cancelled(cancel)?;
        iterations += 1;

        // Sort vertices by objective value
        let mut indices: Vec<usize> = (0..=n).collect();
        indices.sort_by(|&a, &b| {
            values[a]
                .partial_cmp(&values[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let best_idx = indices[0];
        let worst_idx = indices[n];
        let second_worst_idx = indices[n - 1];

        // Equal values alone are not enough: vertices straddling the
        // minimum tie without being near it.
        let range = values[worst_idx] - values[best_idx];
        let centroid = compute_centroid(&simplex, worst_idx);
        let max_dist = simplex
            .iter()
            .map(|v| euclidean_distance(v, &centroid))
            .fold(0.0, f64::max);
        if range.is_finite() && range < config.tolerance && max_dist < config.x_tolerance {
            converged = true;
            break;
        }

        // Reflection
        let reflected = reflect(&simplex[worst_idx], &centroid, config.alpha);
        let reflected_value = eval(&reflected);

        if reflected_value < values[second_worst_idx] && reflected_value >= values[best_idx] {
            simplex[worst_idx] = reflected;
            values[worst_idx] = reflected_value;
            continue;
        }

        if reflected_value < values[best_idx] {
            // Try expansion
            let expanded = expand(&centroid, &reflected, config.gamma);
            let expanded_value = eval(&expanded);

            if expanded_value < reflected_value {
                simplex[worst_idx] = expanded;
                values[worst_idx] = expanded_value;
            } else {
                simplex[worst_idx] = reflected;
                values[worst_idx] = reflected_value;
            }
            continue;
        }

        // Contraction
        if reflected_value < values[worst_idx] {
            // Outside contraction
            let contracted = contract(&centroid, &reflected, config.rho);
            let contracted_value = eval(&contracted);

            if contracted_value <= reflected_value {
                simplex[worst_idx] = contracted;
                values[worst_idx] = contracted_value;
                continue;
            }
        } else {
            // Inside contraction
            let contracted = contract(&centroid, &simplex[worst_idx], config.rho);
            let contracted_value = eval(&contracted);

            if contracted_value < values[worst_idx] {
                simplex[worst_idx] = contracted;
                values[worst_idx] = contracted_value;
                continue;
            }
        }

        // Shrink
        let best = simplex[best_idx].clone();
        for i in 0..=n {
            if i != best_idx {
                for j in 0..n {
                    simplex[i][j] = best[j] + config.sigma * (simplex[i][j] - best[j]);
                }
                values[i] = eval(&simplex[i]);
            }
        }
    }

    let best_idx = values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);

    Ok(OptimizationResult {
        optimal_point: simplex[best_idx].clone(),
        optimal_value: values[best_idx],
        iterations,
        converged,
    })
}

/// Compute centroid of simplex excluding the worst vertex.
fn compute_centroid(simplex: &[Vec<f64>], exclude_idx: usize) -> Vec<f64> {
    let n = simplex[0].len();
    let count = simplex.len() - 1;
    let mut centroid = vec![0.0; n];

    for (i, vertex) in simplex.iter().enumerate() {
        if i != exclude_idx {
            for j in 0..n {
                centroid[j] += vertex[j];
            }
        }
    }

    for c in &mut centroid {
        *c /= count as f64;
    }

    centroid
}

/// Reflect a point through the centroid.
fn reflect(point: &[f64], centroid: &[f64], alpha: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(point.iter())
        .map(|(c, p)| c + alpha * (c - p))
        .collect()
}

/// Expand from centroid towards reflected point.
fn expand(centroid: &[f64], reflected: &[f64], gamma: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(reflected.iter())
        .map(|(c, r)| c + gamma * (r - c))
        .collect()
}

/// Contract between centroid and a point.
fn contract(centroid: &[f64], point: &[f64], rho: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(point.iter())
        .map(|(c, p)| c + rho * (p - c))
        .collect()
}

/// Euclidean distance between two points.
fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
