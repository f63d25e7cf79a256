//! Naive (lag-1) baseline model.
//!
//! Forecasts every future step as the last observed value. This is the
//! benchmark model behind the MASE denominator and a convenient stand-in
//! backend in tests.

use crate::core::{ExogenousMatrix, Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::traits::ExogForecaster;

/// Lag-1 naive forecaster. Ignores exogenous regressors.
#[derive(Debug, Clone, Default)]
pub struct Naive {
    last: Option<f64>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl Naive {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExogForecaster for Naive {
    fn fit(&mut self, series: &TimeSeries, _exog: Option<&ExogenousMatrix>) -> Result<()> {
        let values = series.values();
        if values.is_empty() {
            return Err(ForecastError::EmptyData);
        }

        let mut fitted = Vec::with_capacity(values.len());
        fitted.push(f64::NAN);
        fitted.extend_from_slice(&values[..values.len() - 1]);

        let residuals = values
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| if f.is_nan() { 0.0 } else { y - f })
            .collect();

        self.last = values.last().copied();
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        Ok(())
    }

    fn predict(&self, horizon: usize, _exog_future: Option<&ExogenousMatrix>) -> Result<Forecast> {
        let last = self.last.ok_or(ForecastError::FitRequired)?;
        Ok(Forecast::from_points(vec![last; horizon]))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn aic(&self) -> Option<f64> {
        None
    }

    fn bic(&self) -> Option<f64> {
        None
    }

    fn name(&self) -> &str {
        "Naive"
    }
}
