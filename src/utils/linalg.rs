//! Small dense linear algebra helpers on row-major `Vec<Vec<f64>>` matrices.
//!
//! The systems solved in this crate are tiny (a handful of ARMA parameters or
//! a state dimension of at most `max(p, q + 1)` squared), so plain loops are
//! used instead of a matrix library.

/// Cholesky factor `L` of a symmetric positive definite matrix (`A = L L'`).
///
/// Returns `None` if the matrix is not positive definite.
pub fn cholesky(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        if a[i].len() != n {
            return None;
        }
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None; // Not positive definite
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    Some(l)
}

/// Solve `L L' x = b` given the Cholesky factor `L`.
fn cholesky_solve(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();

    // Forward substitution: L @ y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // Backward substitution: L' @ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    x
}

/// Solve symmetric positive definite system using Cholesky decomposition.
///
/// Solves A @ x = b where A is symmetric positive definite.
pub fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }
    let l = cholesky(a)?;
    Some(cholesky_solve(&l, b))
}

/// Inverse of a symmetric positive definite matrix.
///
/// Returns `None` when the matrix is not positive definite.
pub fn invert_spd(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    if n == 0 {
        return Some(vec![]);
    }
    let l = cholesky(a)?;

    let mut inverse = vec![vec![0.0; n]; n];
    let mut unit = vec![0.0; n];
    for col in 0..n {
        unit.iter_mut().for_each(|u| *u = 0.0);
        unit[col] = 1.0;
        let x = cholesky_solve(&l, &unit);
        for row in 0..n {
            inverse[row][col] = x[row];
        }
    }

    // Symmetrize away round-off
    for i in 0..n {
        for j in (i + 1)..n {
            let avg = 0.5 * (inverse[i][j] + inverse[j][i]);
            inverse[i][j] = avg;
            inverse[j][i] = avg;
        }
    }

    Some(inverse)
}

/// Solve a general square system with Gaussian elimination and partial pivoting.
///
/// Returns `None` if the matrix is (numerically) singular.
pub fn solve_linear(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return None;
    }

    let mut m: Vec<Vec<f64>> = a.to_vec();
    let mut rhs = b.to_vec();
    let scale = m
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        .max(1.0);

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| {
                m[i][col]
                    .abs()
                    .partial_cmp(&m[j][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);

        if m[pivot][col].abs() <= 1e-12 * scale {
            return None;
        }
        m.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = m[row][col] / m[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                m[row][k] -= factor * m[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = rhs[i];
        for j in (i + 1)..n {
            sum -= m[i][j] * x[j];
        }
        x[i] = sum / m[i][i];
    }

    Some(x)
}
