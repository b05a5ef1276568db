//! Numerical utilities shared by the estimator and diagnostics.

pub mod cancel;
pub mod linalg;
pub mod numdiff;
pub mod ols;
pub mod optimization;
pub mod stats;

pub use cancel::CancellationToken;
pub use ols::{ols_fit, OLSResult};
pub use optimization::{
    bfgs, nelder_mead, BfgsConfig, NelderMeadConfig, OptimizationResult,
};
pub use stats::{quantile_normal, normal_two_sided_p};
