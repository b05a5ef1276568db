//! Central finite-difference gradients and Hessians.

/// Relative step for a central first difference around `x`.
fn gradient_step(x: f64) -> f64 {
    f64::EPSILON.cbrt() * x.abs().max(1.0)
}

/// Relative step for a central second difference around `x`.
pub fn hessian_step(x: f64) -> f64 {
    f64::EPSILON.powf(0.25) * x.abs().max(1.0)
}

/// Central-difference gradient of `f` at `x`.
///
/// Non-finite function values propagate into the result, so callers can
/// detect that the gradient is unusable.
pub fn gradient<F>(f: &F, x: &[f64]) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut point = x.to_vec();
    let mut grad = Vec::with_capacity(x.len());

    for i in 0..x.len() {
        let h = gradient_step(x[i]);
        point[i] = x[i] + h;
        let forward = f(&point);
        point[i] = x[i] - h;
        let backward = f(&point);
        point[i] = x[i];
        grad.push((forward - backward) / (2.0 * h));
    }

    grad
}

/// Central-difference Hessian with a step per coordinate, symmetrized.
///
/// [`hessian_step`] suits most coordinates; one living on a small scale
/// (e.g. a variance) needs a step relative to its own magnitude.
pub fn hessian_with_steps<F>(f: &F, x: &[f64], steps: &[f64]) -> Vec<Vec<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let n = x.len();
    let mut hess = vec![vec![0.0; n]; n];
    let f0 = f(x);
    let mut point = x.to_vec();

    for i in 0..n {
        let hi = steps[i];

        point[i] = x[i] + hi;
        let fp = f(&point);
        point[i] = x[i] - hi;
        let fm = f(&point);
        point[i] = x[i];
        hess[i][i] = (fp - 2.0 * f0 + fm) / (hi * hi);

        for j in (i + 1)..n {
            let hj = steps[j];
            let mut eval = |si: f64, sj: f64| {
                point[i] = x[i] + si * hi;
                point[j] = x[j] + sj * hj;
                let v = f(&point);
                point[i] = x[i];
                point[j] = x[j];
                v
            };
            let fpp = eval(1.0, 1.0);
            let fpm = eval(1.0, -1.0);
            let fmp = eval(-1.0, 1.0);
            let fmm = eval(-1.0, -1.0);
            let v = (fpp - fpm - fmp + fmm) / (4.0 * hi * hj);
            hess[i][j] = v;
            hess[j][i] = v;
        }
    }

    hess
}
