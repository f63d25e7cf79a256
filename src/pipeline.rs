//! End-to-end analysis pipeline.
//!
//! Wires the stages together on the default backends: stationarity check
//! -> order search -> break detection -> indicator encoding -> ARIMAX
//! finalization -> rolling backtest. Per-item failures stay inside their
//! stage; only an exhausted order grid (or a failed final fit) aborts the
//! run.

use chrono::{DateTime, Utc};

use crate::backtest::{rolling_backtest, BacktestConfig, BacktestReport};
use crate::breaks::{
    breaks_from_dates, detect_breaks, encode_breaks, extend_breaks, BreakPoint,
    ChangePointDetector, PeltDetector, RegimeExtension,
};
use crate::core::{ExogenousMatrix, Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::{Arima, ExogForecaster, Order};
use crate::selection::{select_order, OrderSearch, OrderSearchConfig};
use crate::utils::metrics::{fit_accuracy, FitAccuracy};
use crate::validation::{decide_differencing, ljung_box, DifferencingDecision, LjungBoxResult};

/// Where the structural break dates come from.
#[derive(Debug, Clone)]
pub enum BreakSource {
    /// Run the changepoint detector with this penalty.
    Detect {
        /// Detection penalty; higher means fewer breaks.
        penalty: f64,
    },
    /// Caller-supplied break dates (e.g. hand-curated after inspection);
    /// detection is bypassed entirely.
    Manual(Vec<DateTime<Utc>>),
}

impl Default for BreakSource {
    fn default() -> Self {
        BreakSource::Detect { penalty: 10.0 }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Order grid and scoring. When `infer_differencing` is set, the
    /// grid's `d` is replaced by the stationarity stage's decision.
    pub search: OrderSearchConfig,
    /// Decide `d` from ADF/KPSS instead of using `search.d` as given.
    pub infer_differencing: bool,
    /// Cap for the differencing decision.
    pub max_d: usize,
    /// Break source.
    pub breaks: BreakSource,
    /// Forecast-time extension policy for break indicators.
    pub regime: RegimeExtension,
    /// Forecast horizon of the final ARIMAX fit.
    pub horizon: usize,
    /// Confidence level for the forecast interval.
    pub interval_level: f64,
    /// Optional rolling backtest of the selected order.
    pub backtest: Option<BacktestConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            search: OrderSearchConfig::default(),
            infer_differencing: true,
            max_d: 2,
            breaks: BreakSource::default(),
            regime: RegimeExtension::default(),
            horizon: 6,
            interval_level: 0.95,
            backtest: None,
        }
    }
}

/// Everything the pipeline produces for downstream reporting.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Stationarity stage outcome, when differencing was inferred.
    pub differencing: Option<DifferencingDecision>,
    /// Order search outcome, including the per-candidate score table.
    pub search: OrderSearch,
    /// Normalized structural breaks.
    pub breaks: Vec<BreakPoint>,
    /// Break indicator matrix aligned to the series.
    pub exog: ExogenousMatrix,
    /// Final forecast with intervals.
    pub forecast: Forecast,
    /// Month-grid dates of the forecast steps.
    pub forecast_dates: Vec<DateTime<Utc>>,
    /// In-sample accuracy of the final fit. Measures fit quality; keep it
    /// apart from the out-of-sample backtest table.
    pub fit_accuracy: FitAccuracy,
    /// Ljung-Box diagnostic on the final fit's residuals.
    pub residual_diagnostic: LjungBoxResult,
    /// Rolling backtest of the selected order, when configured.
    pub backtest: Option<BacktestReport>,
}

/// Fit the selected order with break regressors over the full series and
/// forecast `horizon` steps under the given extension policy.
pub fn finalize_arimax(
    series: &TimeSeries,
    order: Order,
    exog: &ExogenousMatrix,
    regime: RegimeExtension,
    horizon: usize,
    interval_level: f64,
) -> Result<(Arima, Forecast)> {
    let mut model = Arima::new(order);
    let exog_opt = (!exog.is_empty()).then_some(exog);
    model.fit(series, exog_opt)?;

    let future = extend_breaks(exog, horizon, regime);
    let future_opt = (!future.is_empty()).then_some(&future);
    let forecast = model.predict_with_intervals(horizon, interval_level, future_opt)?;
    Ok((model, forecast))
}

/// Run the full pipeline with the default PELT detector.
pub fn run(series: &TimeSeries, config: &PipelineConfig) -> Result<PipelineReport> {
    run_with_detector(series, config, &PeltDetector::new())
}

/// Run the full pipeline with a caller-supplied detection backend.
pub fn run_with_detector(
    series: &TimeSeries,
    config: &PipelineConfig,
    detector: &dyn ChangePointDetector,
) -> Result<PipelineReport> {
    if series.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if config.horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "forecast horizon must be at least 1".to_string(),
        ));
    }

    // Stationarity: fix the grid's d.
    let mut search_config = config.search.clone();
    let differencing = if config.infer_differencing {
        let decision = decide_differencing(series.values(), config.max_d);
        search_config.d = decision.d;
        Some(decision)
    } else {
        None
    };

    // Order search over ARIMA fits without regressors.
    let search = select_order(series, &search_config, Arima::new)?;

    // Structural breaks, from either source, in one representation.
    let breaks = match &config.breaks {
        BreakSource::Detect { penalty } => detect_breaks(series, detector, *penalty),
        BreakSource::Manual(dates) => breaks_from_dates(series, dates),
    };
    let exog = encode_breaks(series, &breaks)?;

    // Final ARIMAX fit and forecast.
    let (model, forecast) = finalize_arimax(
        series,
        search.best.order,
        &exog,
        config.regime,
        config.horizon,
        config.interval_level,
    )?;

    let fitted = model.fitted_values().ok_or(ForecastError::FitRequired)?;
    let accuracy = fit_accuracy(series.values(), fitted)?;
    let residuals = model.residuals().ok_or(ForecastError::FitRequired)?;
    let order = search.best.order;
    let residual_diagnostic = ljung_box(residuals, None, order.p + order.q);

    let forecast_dates = (1..=config.horizon)
        .map(|h| series.future_month(h))
        .collect::<Result<Vec<_>>>()?;

    // Out-of-sample evaluation of the selected order, without regressors
    // (each refit sees only its own training window).
    let backtest = match &config.backtest {
        Some(bt_config) => Some(rolling_backtest(series, bt_config, || Arima::new(order))?),
        None => None,
    };

    Ok(PipelineReport {
        differencing,
        search,
        breaks,
        exog,
        forecast,
        forecast_dates,
        fit_accuracy: accuracy,
        residual_diagnostic,
        backtest,
    })
}
