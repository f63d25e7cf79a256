//! Rolling-origin forecast evaluation.

pub mod rolling;

pub use rolling::{
    rolling_backtest, BacktestConfig, BacktestReport, LeadTimeAccuracy, MaseBenchmark,
};
