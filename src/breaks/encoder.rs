//! Structural-break indicator encoding.
//!
//! Each breakpoint becomes one 0/1 step regressor: zero before the break
//! date, one at and after it. Column order follows the given break order;
//! downstream coefficient interpretation and forecast extension rely on it.

use crate::breaks::detector::BreakPoint;
use crate::core::{ExogenousMatrix, TimeSeries};
use crate::error::{ForecastError, Result};

/// How break indicators extend past the observed series when forecasting.
///
/// This is a modeling policy, not a derived fact. `Permanent` treats every
/// detected regime change as lasting: all indicator columns stay at 1 for
/// every future step. `Pulse` reads breaks as one-time level events whose
/// indicator returns to 0 beyond the sample. Substituting one for the
/// other changes forecasts whenever any break coefficient is nonzero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegimeExtension {
    /// Post-break regime is assumed permanent: future indicators are 1.
    #[default]
    Permanent,
    /// Breaks are one-time pulses: future indicators are 0.
    Pulse,
}

/// Build one indicator column per breakpoint, aligned to the series index.
///
/// Zero breakpoints yield an empty matrix with no columns, which every
/// consumer accepts. Breakpoint indices must lie inside the series.
pub fn encode_breaks(series: &TimeSeries, breaks: &[BreakPoint]) -> Result<ExogenousMatrix> {
    let n = series.len();
    let mut matrix = ExogenousMatrix::empty(n);

    for (i, breakpoint) in breaks.iter().enumerate() {
        if breakpoint.index >= n {
            return Err(ForecastError::IndexOutOfBounds {
                index: breakpoint.index,
                size: n,
            });
        }
        let column: Vec<f64> = series
            .timestamps()
            .iter()
            .map(|&t| if t >= breakpoint.date { 1.0 } else { 0.0 })
            .collect();
        matrix.push_column(format!("break_{}", i + 1), column)?;
    }
    Ok(matrix)
}

/// Produce the future rows of the indicator matrix for `horizon` forecast
/// steps under the given extension policy.
///
/// Column names and order are copied from the in-sample matrix so the
/// fitted coefficients line up.
pub fn extend_breaks(
    in_sample: &ExogenousMatrix,
    horizon: usize,
    policy: RegimeExtension,
) -> ExogenousMatrix {
    let fill = match policy {
        RegimeExtension::Permanent => 1.0,
        RegimeExtension::Pulse => 0.0,
    };
    let mut future = ExogenousMatrix::empty(horizon);
    for name in in_sample.names() {
        // Row count always matches: every column is the same fill vector.
        future
            .push_column(name.clone(), vec![fill; horizon])
            .expect("future matrix rows are fixed by construction");
    }
    future
}
