//! Accuracy metrics for fitted values and forecasts.

use crate::error::{ForecastError, Result};

/// In-sample accuracy of a fitted model, computed once over the full fit.
///
/// This measures fit quality, not out-of-sample forecast accuracy; the
/// rolling backtest in [`crate::backtest`] produces the latter and the two
/// must not be conflated.
#[derive(Debug, Clone)]
pub struct FitAccuracy {
    /// Mean squared error.
    pub mse: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute percentage error, in percent. Observations with a zero
    /// actual are excluded from the mean; `None` when nothing remains.
    pub mape: Option<f64>,
    /// Coefficient of determination.
    pub r_squared: f64,
}

/// Compute in-sample accuracy between actual and fitted values.
///
/// Positions where the fitted value is non-finite (the backend's warm-up
/// NaNs) are excluded from every metric.
pub fn fit_accuracy(actual: &[f64], fitted: &[f64]) -> Result<FitAccuracy> {
    if actual.len() != fitted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: fitted.len(),
        });
    }

    let pairs: Vec<(f64, f64)> = actual
        .iter()
        .zip(fitted.iter())
        .filter(|(_, f)| f.is_finite())
        .map(|(&a, &f)| (a, f))
        .collect();
    if pairs.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    let n = pairs.len() as f64;

    let mae = pairs.iter().map(|(a, f)| (a - f).abs()).sum::<f64>() / n;
    let mse = pairs.iter().map(|(a, f)| (a - f).powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    let (valid_actual, errors): (Vec<f64>, Vec<f64>) =
        pairs.iter().map(|(a, f)| (*a, a - f)).unzip();
    let mape = mean_absolute_percentage(&valid_actual, &errors);

    let mean_actual = valid_actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = valid_actual
        .iter()
        .map(|a| (a - mean_actual).powi(2))
        .sum();
    let ss_res: f64 = pairs.iter().map(|(a, f)| (a - f).powi(2)).sum();
    let r_squared = if ss_tot == 0.0 {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(FitAccuracy {
        mse,
        mae,
        rmse,
        mape,
        r_squared,
    })
}

/// MAPE (in percent) over paired actuals and signed errors.
///
/// Zero actuals contribute an undefined ratio and are excluded from the
/// mean rather than raising or poisoning it with NaN. Returns `None` when
/// every actual is zero.
pub fn mean_absolute_percentage(actual: &[f64], errors: &[f64]) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for (&a, &e) in actual.iter().zip(errors.iter()) {
        if a != 0.0 {
            sum += (e / a).abs();
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(100.0 * sum / count as f64)
    }
}

/// Absolute lag-1 naive forecast errors `|y_t - y_{t-1}|`.
///
/// The MASE benchmark: mean of these is the scale against which forecast
/// MAE is judged.
pub fn naive_absolute_errors(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| (w[1] - w[0]).abs()).collect()
}
