//! ARIMA/ARIMAX estimation backend.
//!
//! Parameters are estimated by conditional sum of squares minimized with
//! Nelder-Mead. Exogenous regressors are handled as regression with ARIMA
//! errors: an OLS pass absorbs the regressors, the ARIMA recursion models
//! the regression error process, and forecasts add the two parts back
//! together.

use std::fmt;

use statrs::distribution::{ContinuousCDF, Normal};

use crate::core::{ExogenousMatrix, Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{binomial, difference, integrate};
use crate::models::traits::ExogForecaster;
use crate::utils::ols::{ols_fit, OlsFit};
use crate::utils::optimization::{minimize, SimplexConfig};

/// ARIMA model order (p, d, q).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Order {
    /// Autoregressive order.
    pub p: usize,
    /// Differencing order.
    pub d: usize,
    /// Moving-average order.
    pub q: usize,
}

impl Order {
    /// Create a new order triple.
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Number of estimated ARMA parameters (AR + MA + intercept).
    pub fn num_params(&self) -> usize {
        self.p + self.q + 1
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.p, self.d, self.q)
    }
}

/// ARIMA forecaster, optionally with exogenous regressors (ARIMAX).
#[derive(Debug, Clone)]
pub struct Arima {
    order: Order,
    ar: Vec<f64>,
    ma: Vec<f64>,
    intercept: f64,
    regression: Option<OlsFit>,
    regression_fitted: Option<Vec<f64>>,
    error_series: Option<Vec<f64>>,
    differenced: Option<Vec<f64>>,
    diff_residuals: Option<Vec<f64>>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    residual_variance: Option<f64>,
    aic: Option<f64>,
    bic: Option<f64>,
}

impl Arima {
    /// Create an unfitted model with the given order.
    pub fn new(order: Order) -> Self {
        Self {
            order,
            ar: Vec::new(),
            ma: Vec::new(),
            intercept: 0.0,
            regression: None,
            regression_fitted: None,
            error_series: None,
            differenced: None,
            diff_residuals: None,
            fitted: None,
            residuals: None,
            residual_variance: None,
            aic: None,
            bic: None,
        }
    }

    /// Convenience constructor from raw (p, d, q).
    pub fn with_order(p: usize, d: usize, q: usize) -> Self {
        Self::new(Order::new(p, d, q))
    }

    /// The model order.
    pub fn order(&self) -> Order {
        self.order
    }

    /// Estimated AR coefficients.
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    /// Estimated MA coefficients.
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    /// Estimated intercept of the (differenced) error process.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Fitted regression coefficients on the exogenous columns, if the
    /// model was fitted with regressors.
    pub fn exog_coefficients(&self) -> Option<&[f64]> {
        self.regression.as_ref().map(|r| r.coefficients.as_slice())
    }

    /// Residual variance of the ARMA recursion.
    pub fn residual_variance(&self) -> Option<f64> {
        self.residual_variance
    }

    fn num_exog(&self) -> usize {
        self.regression
            .as_ref()
            .map(|r| r.num_regressors())
            .unwrap_or(0)
    }

    /// Conditional sum of squares of the ARMA recursion on the differenced
    /// series for a given parameter vector.
    fn css(diff: &[f64], p: usize, q: usize, ar: &[f64], ma: &[f64], intercept: f64) -> f64 {
        let n = diff.len();
        let start = p.max(q);
        if n <= start {
            return f64::MAX;
        }

        let mut residuals = vec![0.0; n];
        let mut total = 0.0;
        for t in start..n {
            let mut pred = intercept;
            for i in 0..p {
                pred += ar[i] * (diff[t - 1 - i] - intercept);
            }
            for i in 0..q {
                pred += ma[i] * residuals[t - 1 - i];
            }
            let error = diff[t] - pred;
            residuals[t] = error;
            total += error * error;
        }
        total
    }

    fn estimate_parameters(&mut self, diff: &[f64]) -> Result<()> {
        let p = self.order.p;
        let q = self.order.q;
        let mean = diff.iter().sum::<f64>() / diff.len() as f64;

        if p == 0 && q == 0 {
            self.intercept = mean;
            self.ar = Vec::new();
            self.ma = Vec::new();
            return Ok(());
        }

        let mut initial = vec![0.0; p + q + 1];
        initial[0] = mean;
        for i in 0..p {
            initial[1 + i] = 0.1 / (i + 1) as f64;
        }
        for i in 0..q {
            initial[1 + p + i] = 0.1 / (i + 1) as f64;
        }

        // Box bounds keep the recursion inside the stationary/invertible
        // region.
        let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY)];
        bounds.extend(std::iter::repeat((-0.99, 0.99)).take(p + q));

        let config = SimplexConfig {
            max_iter: 1000,
            tolerance: 1e-8,
            ..Default::default()
        };
        let result = minimize(
            |params| {
                let intercept = params[0];
                let ar = &params[1..1 + p];
                let ma = &params[1 + p..];
                Self::css(diff, p, q, ar, ma, intercept)
            },
            &initial,
            Some(&bounds),
            &config,
        );

        if !result.value.is_finite() {
            return Err(ForecastError::NonConvergent(format!(
                "CSS objective diverged for order {}",
                self.order
            )));
        }

        self.intercept = result.point[0];
        self.ar = result.point[1..1 + p].to_vec();
        self.ma = result.point[1 + p..].to_vec();
        Ok(())
    }

    /// One-step predictions and residuals on the differenced scale, then
    /// reconstructed on the original scale for reporting.
    fn compute_fit_statistics(&mut self, values: &[f64], error_series: &[f64], diff: &[f64]) {
        let p = self.order.p;
        let d = self.order.d;
        let q = self.order.q;
        let n_diff = diff.len();
        let start = p.max(q);

        let mut fitted_diff = vec![f64::NAN; n_diff];
        let mut resid_diff = vec![0.0; n_diff];
        for t in start..n_diff {
            let mut pred = self.intercept;
            for i in 0..p {
                pred += self.ar[i] * (diff[t - 1 - i] - self.intercept);
            }
            for i in 0..q {
                pred += self.ma[i] * resid_diff[t - 1 - i];
            }
            fitted_diff[t] = pred;
            resid_diff[t] = diff[t] - pred;
        }

        let n_eff = n_diff - start;
        if n_eff > 0 {
            let mut variance =
                resid_diff[start..].iter().map(|r| r * r).sum::<f64>() / n_eff as f64;
            // A flat residual vector collapses the likelihood; floor keeps
            // the criteria finite so the candidate stays comparable.
            if variance <= 0.0 {
                variance = f64::EPSILON;
            }
            self.residual_variance = Some(variance);

            let k = (self.order.num_params() + self.num_exog()) as f64;
            let n_eff = n_eff as f64;
            let ll = -0.5 * n_eff * (1.0 + variance.ln() + (2.0 * std::f64::consts::PI).ln());
            self.aic = Some(-2.0 * ll + 2.0 * k);
            self.bic = Some(-2.0 * ll + k * n_eff.ln());
        }

        // Reconstruct one-step predictions on the original scale:
        // the predicted difference plus the actual previous error values.
        let n = values.len();
        let mut fitted = vec![f64::NAN; n];
        let mut residuals = vec![0.0; n];
        for t in d..n {
            let j = t - d;
            if !fitted_diff[j].is_finite() {
                continue;
            }
            let mut err_hat = fitted_diff[j];
            for i in 1..=d {
                let sign = if i % 2 == 1 { 1.0 } else { -1.0 };
                err_hat += sign * binomial(d, i) * error_series[t - i];
            }
            let prediction = match &self.regression_fitted {
                Some(reg_fitted) => err_hat + reg_fitted[t],
                None => err_hat,
            };
            fitted[t] = prediction;
            residuals[t] = values[t] - prediction;
        }

        self.differenced = Some(diff.to_vec());
        self.diff_residuals = Some(resid_diff);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
    }

    /// Forecast the regression-error process `horizon` steps ahead on the
    /// original (undifferenced) scale.
    fn forecast_error_process(&self, horizon: usize) -> Result<Vec<f64>> {
        let error_series = self.error_series.as_ref().ok_or(ForecastError::FitRequired)?;
        let diff = self.differenced.as_ref().ok_or(ForecastError::FitRequired)?;
        let resid = self
            .diff_residuals
            .as_ref()
            .ok_or(ForecastError::FitRequired)?;

        let p = self.order.p;
        let q = self.order.q;

        let mut extended = diff.clone();
        let mut extended_resid = resid.clone();
        for _ in 0..horizon {
            let t = extended.len();
            let mut pred = self.intercept;
            for i in 0..p {
                if t > i {
                    pred += self.ar[i] * (extended[t - 1 - i] - self.intercept);
                }
            }
            for i in 0..q {
                if t > i {
                    pred += self.ma[i] * extended_resid[t - 1 - i];
                }
            }
            extended.push(pred);
            // Future shocks are unknown and enter the recursion as zero.
            extended_resid.push(0.0);
        }

        let forecast_diff = extended[diff.len()..].to_vec();
        Ok(if self.order.d > 0 {
            integrate(&forecast_diff, error_series, self.order.d)
        } else {
            forecast_diff
        })
    }

    /// Regression contribution for the forecast steps, validated against
    /// the fitted column layout.
    fn forecast_regression_part(
        &self,
        horizon: usize,
        exog_future: Option<&ExogenousMatrix>,
    ) -> Result<Option<Vec<f64>>> {
        let Some(regression) = &self.regression else {
            return Ok(None);
        };
        let future = exog_future.ok_or_else(|| {
            ForecastError::InvalidParameter(
                "model was fitted with exogenous regressors; future regressor values are required"
                    .to_string(),
            )
        })?;
        if future.num_columns() != regression.num_regressors() {
            return Err(ForecastError::DimensionMismatch {
                expected: regression.num_regressors(),
                got: future.num_columns(),
            });
        }
        if future.rows() < horizon {
            return Err(ForecastError::DimensionMismatch {
                expected: horizon,
                got: future.rows(),
            });
        }
        let window = future.slice_rows(0, horizon)?;
        Ok(Some(regression.predict(&window)?))
    }
}

impl ExogForecaster for Arima {
    fn fit(&mut self, series: &TimeSeries, exog: Option<&ExogenousMatrix>) -> Result<()> {
        let values = series.values();
        let n = values.len();
        let Order { p, d, q } = self.order;

        let min_len = d + p.max(q) + 2;
        if n < min_len {
            return Err(ForecastError::InsufficientData {
                needed: min_len,
                got: n,
            });
        }

        let error_series: Vec<f64> = match exog {
            Some(x) if !x.is_empty() => {
                if x.rows() != n {
                    return Err(ForecastError::DimensionMismatch {
                        expected: n,
                        got: x.rows(),
                    });
                }
                if n < x.num_columns() + 2 {
                    return Err(ForecastError::InsufficientData {
                        needed: x.num_columns() + 2,
                        got: n,
                    });
                }
                let regression = ols_fit(values, x)?;
                let fitted = regression.predict(x)?;
                let errors = values
                    .iter()
                    .zip(fitted.iter())
                    .map(|(y, f)| y - f)
                    .collect();
                self.regression = Some(regression);
                self.regression_fitted = Some(fitted);
                errors
            }
            _ => {
                self.regression = None;
                self.regression_fitted = None;
                values.to_vec()
            }
        };

        let diff = difference(&error_series, d);
        if diff.len() < p.max(q) + 2 {
            return Err(ForecastError::InsufficientData {
                needed: d + p.max(q) + 2,
                got: n,
            });
        }

        self.estimate_parameters(&diff)?;
        self.error_series = Some(error_series.clone());
        self.compute_fit_statistics(values, &error_series, &diff);
        Ok(())
    }

    fn predict(&self, horizon: usize, exog_future: Option<&ExogenousMatrix>) -> Result<Forecast> {
        if self.error_series.is_none() {
            return Err(ForecastError::FitRequired);
        }
        if horizon == 0 {
            return Ok(Forecast::default());
        }

        let mut points = self.forecast_error_process(horizon)?;
        if let Some(regression_part) = self.forecast_regression_part(horizon, exog_future)? {
            for (point, reg) in points.iter_mut().zip(regression_part.iter()) {
                *point += reg;
            }
        }
        Ok(Forecast::from_points(points))
    }

    fn predict_with_intervals(
        &self,
        horizon: usize,
        level: f64,
        exog_future: Option<&ExogenousMatrix>,
    ) -> Result<Forecast> {
        if !(0.0..1.0).contains(&level) || level <= 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "interval level must be in (0, 1), got {level}"
            )));
        }

        let forecast = self.predict(horizon, exog_future)?;
        if horizon == 0 {
            return Ok(forecast);
        }

        let variance = self.residual_variance.unwrap_or(0.0);
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::ComputationError(e.to_string()))?;
        let z = normal.inverse_cdf((1.0 + level) / 2.0);

        let points = forecast.point();
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for (h, &point) in points.iter().enumerate() {
            // Forecast variance accumulates with lead time.
            let se = (variance * (h + 1) as f64).sqrt();
            lower.push(point - z * se);
            upper.push(point + z * se);
        }
        Forecast::with_intervals(points.to_vec(), lower, upper)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn aic(&self) -> Option<f64> {
        self.aic
    }

    fn bic(&self) -> Option<f64> {
        self.bic
    }

    fn name(&self) -> &str {
        if self.regression.is_some() {
            "ARIMAX"
        } else {
            "ARIMA"
        }
    }
}
