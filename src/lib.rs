//! # breakcast
//!
//! Model selection, structural-break integration, and rolling-origin
//! backtesting for monthly time series.
//!
//! The crate takes an inflation-style monthly series through stationarity
//! checks, an ARIMA order grid search scored by information criteria,
//! PELT changepoint detection (or hand-curated break dates), structural-
//! break indicator encoding, a final ARIMAX fit with interval forecasts,
//! and a rolling-origin accuracy backtest against a naive benchmark.
//!
//! Estimation is behind capability seams: [`models::ExogForecaster`] for
//! model fitting and [`breaks::ChangePointDetector`] for changepoint
//! search, with default backends shipped for both.

pub mod backtest;
pub mod breaks;
pub mod core;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod selection;
pub mod utils;
pub mod validation;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::backtest::{rolling_backtest, BacktestConfig, BacktestReport, MaseBenchmark};
    pub use crate::breaks::{
        breaks_from_dates, detect_breaks, encode_breaks, BreakPoint, ChangePointDetector,
        PeltDetector, RegimeExtension,
    };
    pub use crate::core::{ExogenousMatrix, Forecast, TimeSeries};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::{Arima, ExogForecaster, Order};
    pub use crate::pipeline::{run, BreakSource, PipelineConfig, PipelineReport};
    pub use crate::selection::{select_order, BestParams, Criterion, OrderSearchConfig};
    pub use crate::utils::{fit_accuracy, FitAccuracy};
}
