//! Statistical validation: stationarity tests and residual diagnostics.

pub mod residual_tests;
pub mod stationarity;

pub use residual_tests::{ljung_box, LjungBoxResult};
pub use stationarity::{
    adf_test, decide_differencing, kpss_test, CriticalValues, DifferencingDecision,
    StationarityCheck, StationarityResult,
};
