//! Forecast result structure holding point predictions and intervals.

use crate::error::{ForecastError, Result};

/// A univariate forecast: point predictions plus an optional symmetric
/// prediction interval per step.
#[derive(Debug, Clone, Default)]
pub struct Forecast {
    point: Vec<f64>,
    lower: Option<Vec<f64>>,
    upper: Option<Vec<f64>>,
}

impl Forecast {
    /// Create a forecast from point predictions only.
    pub fn from_points(point: Vec<f64>) -> Self {
        Self {
            point,
            lower: None,
            upper: None,
        }
    }

    /// Create a forecast with interval bounds.
    ///
    /// All three vectors must have the same length.
    pub fn with_intervals(point: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        if lower.len() != point.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: point.len(),
                got: lower.len(),
            });
        }
        if upper.len() != point.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: point.len(),
                got: upper.len(),
            });
        }
        Ok(Self {
            point,
            lower: Some(lower),
            upper: Some(upper),
        })
    }

    /// Number of forecast steps.
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    /// Whether the forecast holds no steps.
    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Point predictions.
    pub fn point(&self) -> &[f64] {
        &self.point
    }

    /// Lower interval bounds, if computed.
    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    /// Upper interval bounds, if computed.
    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    /// Whether interval bounds are present.
    pub fn has_intervals(&self) -> bool {
        self.lower.is_some() && self.upper.is_some()
    }

    /// Truncate the forecast to the first `horizon` steps.
    pub fn truncated(&self, horizon: usize) -> Forecast {
        let h = horizon.min(self.point.len());
        Forecast {
            point: self.point[..h].to_vec(),
            lower: self.lower.as_ref().map(|l| l[..h].to_vec()),
            upper: self.upper.as_ref().map(|u| u[..h].to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_has_no_intervals() {
        let f = Forecast::from_points(vec![1.0, 2.0, 3.0]);
        assert_eq!(f.horizon(), 3);
        assert!(!f.has_intervals());
        assert!(f.lower().is_none());
        assert!(f.upper().is_none());
    }

    #[test]
    fn with_intervals_validates_lengths() {
        let ok = Forecast::with_intervals(vec![2.0, 3.0], vec![1.0, 2.0], vec![3.0, 4.0]).unwrap();
        assert!(ok.has_intervals());
        assert_eq!(ok.lower().unwrap(), &[1.0, 2.0]);
        assert_eq!(ok.upper().unwrap(), &[3.0, 4.0]);

        let bad = Forecast::with_intervals(vec![2.0, 3.0], vec![1.0], vec![3.0, 4.0]);
        assert!(matches!(
            bad,
            Err(ForecastError::DimensionMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn truncated_keeps_prefix() {
        let f = Forecast::with_intervals(
            vec![1.0, 2.0, 3.0],
            vec![0.5, 1.5, 2.5],
            vec![1.5, 2.5, 3.5],
        )
        .unwrap();

        let head = f.truncated(1);
        assert_eq!(head.horizon(), 1);
        assert_eq!(head.point(), &[1.0]);
        assert_eq!(head.lower().unwrap(), &[0.5]);

        // Truncating past the end is a no-op.
        let all = f.truncated(10);
        assert_eq!(all.horizon(), 3);
    }
}
