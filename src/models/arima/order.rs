//! ARIMA order triple.

use crate::error::{ForecastError, Result};
use std::fmt;

/// ARIMA model order `(p, d, q)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArimaOrder {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
}

impl ArimaOrder {
    /// Validate a raw order triple as entered by a caller.
    ///
    /// Any negative component fails with [`ForecastError::InvalidOrder`].
    pub fn new(p: i64, d: i64, q: i64) -> Result<Self> {
        match (usize::try_from(p), usize::try_from(d), usize::try_from(q)) {
            (Ok(p), Ok(d), Ok(q)) => Ok(Self { p, d, q }),
            _ => Err(ForecastError::InvalidOrder { p, d, q }),
        }
    }

    /// Build an order from already non-negative components.
    pub const fn from_usize(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Number of ARMA coefficients (p + q).
    pub fn num_arma_params(&self) -> usize {
        self.p + self.q
    }

    /// Number of leading differenced observations without a residual.
    pub fn max_lag(&self) -> usize {
        self.p.max(self.q)
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::from_usize(1, 1, 1)
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}
