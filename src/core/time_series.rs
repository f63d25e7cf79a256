//! TimeSeries data structure for a univariate observed series.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Months, TimeZone, Utc};

/// A univariate time series with strictly increasing timestamps.
///
/// The series is immutable once constructed; the pipeline stages share it
/// by reference and take training windows via [`TimeSeries::slice`].
#[derive(Debug, Clone)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a time series from parallel timestamp and value vectors.
    ///
    /// Timestamps must be strictly increasing and the two vectors must have
    /// the same length. Gaps are the caller's problem: the ingestion stage
    /// is expected to resample to a regular grid before the core runs.
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }
        for i in 1..timestamps.len() {
            if timestamps[i] <= timestamps[i - 1] {
                return Err(ForecastError::TimestampError(
                    "timestamps must be strictly increasing".to_string(),
                ));
            }
        }
        Ok(Self { timestamps, values })
    }

    /// Create a monthly series starting at the first day of the given month.
    ///
    /// Generates a month-start grid (the `MS` convention), one timestamp per
    /// value.
    pub fn monthly(year: i32, month: u32, values: Vec<f64>) -> Result<Self> {
        let start = Utc
            .with_ymd_and_hms(year, month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| {
                ForecastError::TimestampError(format!("invalid start month {year}-{month:02}"))
            })?;
        let timestamps: Vec<DateTime<Utc>> = (0..values.len())
            .map(|i| start + Months::new(i as u32))
            .collect();
        Self::new(timestamps, values)
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Observation timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Observed values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Timestamp at a position.
    pub fn timestamp(&self, index: usize) -> Result<DateTime<Utc>> {
        self.timestamps
            .get(index)
            .copied()
            .ok_or(ForecastError::IndexOutOfBounds {
                index,
                size: self.len(),
            })
    }

    /// Value at a position.
    pub fn value(&self, index: usize) -> Result<f64> {
        self.values
            .get(index)
            .copied()
            .ok_or(ForecastError::IndexOutOfBounds {
                index,
                size: self.len(),
            })
    }

    /// Copy out the half-open window `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(ForecastError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index: end,
                size: self.len(),
            });
        }
        Ok(TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
        })
    }

    /// First position whose timestamp is at or after `date`, if any.
    ///
    /// This is how break dates and backtest origin ranges are anchored to
    /// the observation grid.
    pub fn position_at_or_after(&self, date: DateTime<Utc>) -> Option<usize> {
        self.timestamps.iter().position(|&t| t >= date)
    }

    /// Timestamp the series would have at `len() + steps_ahead - 1` on a
    /// monthly grid, i.e. the date of the `steps_ahead`-th forecast step.
    pub fn future_month(&self, steps_ahead: usize) -> Result<DateTime<Utc>> {
        let last = self
            .timestamps
            .last()
            .copied()
            .ok_or(ForecastError::EmptyData)?;
        last.checked_add_months(Months::new(steps_ahead as u32))
            .ok_or_else(|| ForecastError::TimestampError("month arithmetic overflow".to_string()))
    }
}
