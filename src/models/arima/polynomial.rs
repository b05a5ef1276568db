//! Lag-polynomial helpers: stationarity/invertibility checks and ψ-weights.
//!
//! AR coefficients follow the sign convention `φ(B) = 1 - φ₁B - … - φₚBᵖ`,
//! MA coefficients `θ(B) = 1 + θ₁B + … + θ_qB^q`.

/// Check that all roots of `1 - φ₁z - … - φₚzᵖ` lie outside the unit circle.
///
/// Uses the Durbin–Levinson step-down recursion: the polynomial is stationary
/// exactly when every implied partial autocorrelation has modulus below one.
pub fn is_stationary(ar: &[f64]) -> bool {
    if ar.iter().any(|c| !c.is_finite()) {
        return false;
    }

    let mut a = ar.to_vec();
    while let Some(&r) = a.last() {
        if r.abs() >= 1.0 {
            return false;
        }
        let k = a.len();
        let denom = 1.0 - r * r;
        let next: Vec<f64> = (0..k - 1)
            .map(|j| (a[j] + r * a[k - 2 - j]) / denom)
            .collect();
        a = next;
    }
    true
}

/// Check that all roots of `1 + θ₁z + … + θ_qz^q` lie outside the unit circle.
pub fn is_invertible(ma: &[f64]) -> bool {
    let negated: Vec<f64> = ma.iter().map(|c| -c).collect();
    is_stationary(&negated)
}

/// Coefficients `a*` of the integrated AR operator `φ(B)(1-B)^d = 1 - Σ a*ᵢ Bⁱ`.
pub fn integrated_ar(ar: &[f64], d: usize) -> Vec<f64> {
    // Polynomial in B with constant term first
    let mut poly: Vec<f64> = std::iter::once(1.0)
        .chain(ar.iter().map(|c| -c))
        .collect();

    for _ in 0..d {
        let mut next = vec![0.0; poly.len() + 1];
        for (i, c) in poly.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c;
        }
        poly = next;
    }

    poly.iter().skip(1).map(|c| -c).collect()
}

/// First `h` ψ-weights of `θ(B) / (φ(B)(1-B)^d)`, starting with ψ₀ = 1.
pub fn psi_weights(ar: &[f64], ma: &[f64], d: usize, h: usize) -> Vec<f64> {
    let a_star = integrated_ar(ar, d);
    let mut psi = Vec::with_capacity(h);

    for j in 0..h {
        if j == 0 {
            psi.push(1.0);
            continue;
        }
        let mut value = ma.get(j - 1).copied().unwrap_or(0.0);
        for (i, a) in a_star.iter().enumerate().take(j) {
            value += a * psi[j - 1 - i];
        }
        psi.push(value);
    }

    psi
}
