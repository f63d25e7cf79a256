//! Core data structures shared across the pipeline stages.

pub mod exog;
pub mod forecast;
pub mod time_series;

pub use exog::ExogenousMatrix;
pub use forecast::Forecast;
pub use time_series::TimeSeries;
