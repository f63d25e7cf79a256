//! Spectral screening utilities.

pub mod periodogram;

pub use periodogram::{peak, periodogram, SpectralPoint};
