//! Error types for the breakcast pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur during order selection, break encoding,
/// backtesting, or model fitting.
///
/// Per-item failures (one candidate order, one backtest origin) are caught
/// at their smallest scope by the callers and counted; only
/// [`ForecastError::NoFeasibleOrder`] terminates a whole stage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient observations for the requested operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between aligned structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before forecasting")]
    FitRequired,

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// The estimation backend failed to produce a usable fit for one
    /// (order, training window) pair. Recoverable: callers skip the
    /// candidate or origin and continue.
    #[error("fit did not converge: {0}")]
    NonConvergent(String),

    /// Every candidate order in the search grid failed to fit.
    /// Fatal to the search stage; never silently replaced by a sentinel.
    #[error("no feasible order found: all {attempted} candidates failed")]
    NoFeasibleOrder { attempted: usize },

    /// Numerical failure outside model estimation.
    #[error("computation error: {0}")]
    ComputationError(String),
}
