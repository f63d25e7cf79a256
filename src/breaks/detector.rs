//! Changepoint detector capability and breakpoint normalization.
//!
//! Whatever produces candidate indices (the built-in PELT backend, an
//! external detector, or a hand-curated list of dates), the rest of the
//! pipeline only ever sees validated [`BreakPoint`]s anchored to the
//! series grid.

use chrono::{DateTime, Utc};

use crate::breaks::pelt::{pelt_partition, PeltConfig};
use crate::core::TimeSeries;

/// Interface to a changepoint detection backend.
///
/// Implementations may return out-of-range or unsorted indices; the
/// pipeline normalizes the output before use.
pub trait ChangePointDetector {
    /// Detect candidate changepoint indices in `values` with the given
    /// penalty (higher penalty, fewer changepoints).
    fn detect(&self, values: &[f64], penalty: f64) -> Vec<usize>;
}

/// Default detector backed by the PELT search.
#[derive(Debug, Clone, Default)]
pub struct PeltDetector {
    config: PeltConfig,
}

impl PeltDetector {
    /// Detector with the default configuration (L1 cost).
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector with a custom PELT configuration.
    pub fn with_config(config: PeltConfig) -> Self {
        Self { config }
    }
}

impl ChangePointDetector for PeltDetector {
    fn detect(&self, values: &[f64], penalty: f64) -> Vec<usize> {
        pelt_partition(values, penalty, &self.config).changepoints
    }
}

/// A structural break anchored to a series position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakPoint {
    /// Position in the series, `0 <= index < len`.
    pub index: usize,
    /// Timestamp of that position.
    pub date: DateTime<Utc>,
}

/// Run a detector over the series and normalize its output.
///
/// Out-of-range indices are dropped without failing the run (some
/// backends report the series length itself as a final boundary), the
/// survivors are sorted and deduplicated, and each is mapped to its
/// timestamp.
pub fn detect_breaks(
    series: &TimeSeries,
    detector: &dyn ChangePointDetector,
    penalty: f64,
) -> Vec<BreakPoint> {
    let mut indices = detector.detect(series.values(), penalty);
    indices.retain(|&i| i < series.len());
    indices.sort_unstable();
    indices.dedup();
    indices
        .into_iter()
        .map(|index| BreakPoint {
            index,
            date: series.timestamps()[index],
        })
        .collect()
}

/// Build breakpoints from a caller-supplied list of break dates,
/// bypassing detection entirely.
///
/// Each date maps to the first series position at or after it; dates
/// beyond the end of the series are dropped. The result is
/// indistinguishable from a detector's output, so downstream consumers
/// are detector-agnostic.
pub fn breaks_from_dates(series: &TimeSeries, dates: &[DateTime<Utc>]) -> Vec<BreakPoint> {
    let mut indices: Vec<usize> = dates
        .iter()
        .filter_map(|&date| series.position_at_or_after(date))
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices
        .into_iter()
        .map(|index| BreakPoint {
            index,
            date: series.timestamps()[index],
        })
        .collect()
}
