//! Forecaster trait defining the estimation capability consumed by the
//! selection, finalization, and backtesting stages.

use crate::core::{ExogenousMatrix, Forecast, TimeSeries};
use crate::error::Result;

/// Interface to an estimation backend that fits a forecasting model to a
/// series, optionally with exogenous regressors.
///
/// The orchestration stages treat this as a black box: any compliant
/// backend can be substituted for the built-in ARIMA implementation. A fit
/// that cannot converge must return an `Err`, never a sentinel score, so
/// callers can skip the candidate or origin and continue.
///
/// Object-safe; usable as `Box<dyn ExogForecaster>`.
pub trait ExogForecaster {
    /// Fit the model to the series. `exog` columns must be aligned to the
    /// series index (one row per observation).
    fn fit(&mut self, series: &TimeSeries, exog: Option<&ExogenousMatrix>) -> Result<()>;

    /// Forecast `horizon` steps ahead. When the model was fitted with
    /// regressors, `exog_future` must supply their future values, one row
    /// per forecast step, in the same column order.
    fn predict(&self, horizon: usize, exog_future: Option<&ExogenousMatrix>) -> Result<Forecast>;

    /// Forecast with a symmetric prediction interval at the given
    /// confidence level (e.g. 0.95).
    fn predict_with_intervals(
        &self,
        horizon: usize,
        level: f64,
        exog_future: Option<&ExogenousMatrix>,
    ) -> Result<Forecast> {
        let _ = level;
        self.predict(horizon, exog_future)
    }

    /// In-sample one-step-ahead predictions on the original scale, aligned
    /// to the input index. Warm-up positions that cannot be predicted are
    /// NaN.
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Residuals (actual minus fitted), aligned to the input index.
    fn residuals(&self) -> Option<&[f64]>;

    /// Akaike information criterion of the fit.
    fn aic(&self) -> Option<f64>;

    /// Bayesian information criterion of the fit.
    fn bic(&self) -> Option<f64>;

    /// Model name for reporting.
    fn name(&self) -> &str;

    /// Whether the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
pub type BoxedExogForecaster = Box<dyn ExogForecaster>;
