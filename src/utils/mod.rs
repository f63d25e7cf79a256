//! Numeric utilities shared by the estimation backends and evaluators.

pub mod metrics;
pub mod ols;
pub mod optimization;
pub mod stats;

pub use metrics::{fit_accuracy, mean_absolute_percentage, naive_absolute_errors, FitAccuracy};
pub use ols::{ols_fit, OlsFit};
pub use optimization::{minimize, SimplexConfig, SimplexResult};
