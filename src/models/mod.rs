//! Estimation backends and the capability trait they implement.

mod traits;

pub mod arima;
pub mod naive;

pub use arima::{Arima, Order};
pub use naive::Naive;
pub use traits::{BoxedExogForecaster, ExogForecaster};
