//! Rolling-origin backtesting.
//!
//! Walks forecast origins forward in time, refitting a fresh model at
//! every origin and scoring its forecasts against the observations that
//! follow. Origins are visited chronologically (later refits see strictly
//! more history), and every refit starts from an unfitted model taken from
//! the factory, so no estimation state carries over between origins.

use chrono::{DateTime, Utc};

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::ExogForecaster;
use crate::utils::metrics::{mean_absolute_percentage, naive_absolute_errors};
use crate::utils::stats::mean;

/// Which window feeds the MASE denominator (mean absolute lag-1 naive
/// error).
///
/// The denominator is computed once, not per origin. `FullSeries` uses
/// every observation, including those after the last forecast origin,
/// as a fixed global benchmark. `TrainingWindow` restricts it to the
/// observations a backtest refit could actually have seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaseBenchmark {
    /// Benchmark over the whole series.
    #[default]
    FullSeries,
    /// Benchmark over observations up to and including the last origin.
    TrainingWindow,
}

/// Configuration for a rolling-origin backtest.
#[derive(Debug, Clone)]
pub struct BacktestConfig {
    /// First forecast origin (inclusive); mapped to the first series
    /// position at or after this date.
    pub start: DateTime<Utc>,
    /// Last forecast origin (inclusive); mapped to the last series
    /// position at or before this date.
    pub end: DateTime<Utc>,
    /// Forecast horizon at every origin.
    pub horizon: usize,
    /// MASE denominator policy.
    pub mase_benchmark: MaseBenchmark,
}

/// Aggregate forecast accuracy for one lead time.
#[derive(Debug, Clone)]
pub struct LeadTimeAccuracy {
    /// Lead time in steps ahead of the origin (1-based).
    pub lead: usize,
    /// Number of (origin, actual) pairs that contributed.
    pub observations: usize,
    /// Mean signed error.
    pub me: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute percentage error; zero actuals are excluded, `None`
    /// when no nonzero actual contributed.
    pub mape: Option<f64>,
    /// MAE scaled by the naive benchmark; `None` when the benchmark is
    /// degenerate (constant series) or no errors were recorded.
    pub mase: Option<f64>,
}

/// Outcome of a rolling backtest: per-lead accuracy keyed by lead time.
#[derive(Debug, Clone)]
pub struct BacktestReport {
    /// Configured horizon.
    pub horizon: usize,
    /// Origins whose refit and forecast succeeded.
    pub origins: usize,
    /// Origins dropped because the refit (or forecast) failed; their
    /// errors are omitted from aggregation, not zero-filled.
    pub failed_origins: usize,
    /// Accuracy per lead time, index 0 holding lead 1.
    pub by_lead: Vec<LeadTimeAccuracy>,
}

impl BacktestReport {
    /// Accuracy for a 1-based lead time.
    pub fn lead(&self, lead: usize) -> Option<&LeadTimeAccuracy> {
        if lead == 0 {
            return None;
        }
        self.by_lead.get(lead - 1)
    }
}

/// Run a rolling-origin backtest.
///
/// For each origin `t` in the configured date range, a fresh model from
/// `factory` is fitted on observations `0..=t` and its `horizon`-step
/// forecast is compared against the actuals that exist; signed errors are
/// recorded per lead time. Origins whose refit fails are skipped and
/// counted.
pub fn rolling_backtest<M, F>(
    series: &TimeSeries,
    config: &BacktestConfig,
    factory: F,
) -> Result<BacktestReport>
where
    M: ExogForecaster,
    F: Fn() -> M,
{
    if config.horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "backtest horizon must be at least 1".to_string(),
        ));
    }
    if series.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    let first = series.position_at_or_after(config.start).ok_or_else(|| {
        ForecastError::InvalidParameter("backtest start is beyond the series".to_string())
    })?;
    let last = series
        .timestamps()
        .iter()
        .rposition(|&t| t <= config.end)
        .ok_or_else(|| {
            ForecastError::InvalidParameter("backtest end precedes the series".to_string())
        })?;
    if first > last {
        return Err(ForecastError::InvalidParameter(
            "backtest origin range is empty".to_string(),
        ));
    }

    // errors[lead - 1] collects (signed error, actual) pairs.
    let mut errors: Vec<Vec<(f64, f64)>> = vec![Vec::new(); config.horizon];
    let mut origins = 0usize;
    let mut failed_origins = 0usize;

    for origin in first..=last {
        let train = series.slice(0, origin + 1)?;
        let mut model = factory();
        if model.fit(&train, None).is_err() {
            failed_origins += 1;
            continue;
        }
        let forecast = match model.predict(config.horizon, None) {
            Ok(forecast) => forecast,
            Err(_) => {
                failed_origins += 1;
                continue;
            }
        };
        origins += 1;

        let points = forecast.point();
        for lead in 1..=config.horizon {
            let target = origin + lead;
            if target >= series.len() {
                // The series ends before this lead; nothing to record.
                break;
            }
            let actual = series.values()[target];
            errors[lead - 1].push((actual - points[lead - 1], actual));
        }
    }

    let benchmark_window = match config.mase_benchmark {
        MaseBenchmark::FullSeries => series.values(),
        MaseBenchmark::TrainingWindow => &series.values()[..=last],
    };
    let naive_mae = mean(&naive_absolute_errors(benchmark_window));

    let by_lead = (1..=config.horizon)
        .map(|lead| summarize_lead(lead, &errors[lead - 1], naive_mae))
        .collect();

    Ok(BacktestReport {
        horizon: config.horizon,
        origins,
        failed_origins,
        by_lead,
    })
}

fn summarize_lead(lead: usize, entries: &[(f64, f64)], naive_mae: f64) -> LeadTimeAccuracy {
    let n = entries.len();
    if n == 0 {
        return LeadTimeAccuracy {
            lead,
            observations: 0,
            me: f64::NAN,
            mae: f64::NAN,
            rmse: f64::NAN,
            mape: None,
            mase: None,
        };
    }

    let errors: Vec<f64> = entries.iter().map(|(e, _)| *e).collect();
    let actuals: Vec<f64> = entries.iter().map(|(_, a)| *a).collect();

    let me = errors.iter().sum::<f64>() / n as f64;
    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n as f64;
    let rmse = (errors.iter().map(|e| e * e).sum::<f64>() / n as f64).sqrt();
    let mape = mean_absolute_percentage(&actuals, &errors);
    let mase = if naive_mae.is_finite() && naive_mae > 0.0 {
        Some(mae / naive_mae)
    } else {
        None
    };

    LeadTimeAccuracy {
        lead,
        observations: n,
        me,
        mae,
        rmse,
        mape,
        mase,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ExogenousMatrix, Forecast};
    use crate::models::Naive;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn date(year: i32, month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap()
    }

    fn config(start: DateTime<Utc>, end: DateTime<Utc>, horizon: usize) -> BacktestConfig {
        BacktestConfig {
            start,
            end,
            horizon,
            mase_benchmark: MaseBenchmark::FullSeries,
        }
    }

    /// Backend that refuses to fit on configured training lengths.
    struct Flaky {
        fail_on_len: usize,
        inner: Naive,
    }

    impl ExogForecaster for Flaky {
        fn fit(&mut self, series: &TimeSeries, exog: Option<&ExogenousMatrix>) -> Result<()> {
            if series.len() == self.fail_on_len {
                return Err(ForecastError::NonConvergent("scripted".to_string()));
            }
            self.inner.fit(series, exog)
        }

        fn predict(
            &self,
            horizon: usize,
            exog_future: Option<&ExogenousMatrix>,
        ) -> Result<Forecast> {
            self.inner.predict(horizon, exog_future)
        }

        fn fitted_values(&self) -> Option<&[f64]> {
            self.inner.fitted_values()
        }

        fn residuals(&self) -> Option<&[f64]> {
            self.inner.residuals()
        }

        fn aic(&self) -> Option<f64> {
            None
        }

        fn bic(&self) -> Option<f64> {
            None
        }

        fn name(&self) -> &str {
            "Flaky"
        }
    }

    #[test]
    fn naive_on_linear_trend_has_lead_proportional_errors() {
        // Monthly values 0, 1, 2, ...: the naive forecast undershoots
        // lead i by exactly i.
        let series = TimeSeries::monthly(2020, 1, (0..36).map(|i| i as f64).collect()).unwrap();
        let cfg = config(date(2021, 1), date(2022, 6), 3);

        let report = rolling_backtest(&series, &cfg, Naive::new).unwrap();

        assert_eq!(report.failed_origins, 0);
        for lead in 1..=3 {
            let acc = report.lead(lead).unwrap();
            assert_relative_eq!(acc.me, lead as f64, epsilon = 1e-12);
            assert_relative_eq!(acc.mae, lead as f64, epsilon = 1e-12);
            assert_relative_eq!(acc.rmse, lead as f64, epsilon = 1e-12);
            // Naive benchmark error is exactly 1, so MASE equals MAE.
            assert_relative_eq!(acc.mase.unwrap(), lead as f64, epsilon = 1e-12);
        }
    }

    #[test]
    fn recorded_errors_never_exceed_observable_origins() {
        let n = 30;
        let series = TimeSeries::monthly(2020, 1, (0..n).map(|i| i as f64).collect()).unwrap();
        // Origins cover the last year of data, so long leads run out of
        // actuals.
        let cfg = config(date(2021, 6), date(2022, 6), 6);
        let report = rolling_backtest(&series, &cfg, Naive::new).unwrap();

        // Origins are indices 17..=29 (13 origins).
        assert_eq!(report.origins, 13);
        for lead in 1..=6 {
            let acc = report.lead(lead).unwrap();
            // Only origins with index + lead < n can contribute.
            let observable = (17..=29).filter(|origin| origin + lead < n).count();
            assert_eq!(acc.observations, observable, "lead {lead}");
        }
    }

    #[test]
    fn zero_actuals_are_excluded_from_mape_without_raising() {
        // Series crossing zero: MAPE must skip the zero actuals.
        let values = vec![1.0, 2.0, 0.0, 2.0, 0.0, 2.0, 1.0, 3.0, 2.0, 1.0];
        let series = TimeSeries::monthly(2020, 1, values).unwrap();
        let cfg = config(date(2020, 3), date(2020, 9), 1);

        let report = rolling_backtest(&series, &cfg, Naive::new).unwrap();
        let acc = report.lead(1).unwrap();

        assert!(acc.observations > 0);
        // The metric exists (some nonzero actuals) and is finite.
        assert!(acc.mape.unwrap().is_finite());
    }

    #[test]
    fn failed_refits_are_omitted_not_zeroed() {
        let series = TimeSeries::monthly(2020, 1, (0..20).map(|i| i as f64).collect()).unwrap();
        let cfg = config(date(2020, 6), date(2021, 4), 1);

        let clean = rolling_backtest(&series, &cfg, Naive::new).unwrap();
        // Training length 8 corresponds to one origin in the range.
        let flaky = rolling_backtest(&series, &cfg, || Flaky {
            fail_on_len: 8,
            inner: Naive::new(),
        })
        .unwrap();

        assert_eq!(flaky.failed_origins, 1);
        assert_eq!(flaky.origins, clean.origins - 1);
        assert_eq!(
            flaky.lead(1).unwrap().observations,
            clean.lead(1).unwrap().observations - 1
        );
        // Every origin on this trend has error exactly 1; if the failed
        // origin were zero-filled instead of omitted the mean would
        // shrink below 1.
        assert_relative_eq!(
            flaky.lead(1).unwrap().mae,
            clean.lead(1).unwrap().mae,
            epsilon = 1e-12
        );
    }

    #[test]
    fn backtest_is_deterministic() {
        let values: Vec<f64> = (0..30).map(|i| (i as f64 * 0.7).sin() + 5.0).collect();
        let series = TimeSeries::monthly(2018, 1, values).unwrap();
        let cfg = config(date(2019, 1), date(2020, 3), 4);

        let a = rolling_backtest(&series, &cfg, Naive::new).unwrap();
        let b = rolling_backtest(&series, &cfg, Naive::new).unwrap();

        assert_eq!(a.origins, b.origins);
        for lead in 1..=4 {
            assert_relative_eq!(
                a.lead(lead).unwrap().me,
                b.lead(lead).unwrap().me,
                epsilon = 1e-15
            );
        }
    }

    #[test]
    fn mase_benchmark_window_is_a_policy() {
        // Quiet until the last origin, wild afterwards: the two benchmark
        // policies must disagree.
        let mut values: Vec<f64> = (0..20).map(|i| i as f64).collect();
        values.extend([100.0, -100.0, 100.0, -100.0]);
        let series = TimeSeries::monthly(2020, 1, values).unwrap();

        let full_cfg = config(date(2020, 6), date(2021, 8), 2);
        let train_cfg = BacktestConfig {
            mase_benchmark: MaseBenchmark::TrainingWindow,
            ..full_cfg.clone()
        };

        let full = rolling_backtest(&series, &full_cfg, Naive::new).unwrap();
        let train = rolling_backtest(&series, &train_cfg, Naive::new).unwrap();

        let full_mase = full.lead(1).unwrap().mase.unwrap();
        let train_mase = train.lead(1).unwrap().mase.unwrap();
        // The full-series benchmark includes the wild tail, inflating the
        // denominator and deflating MASE.
        assert!(full_mase < train_mase);
    }

    #[test]
    fn configuration_is_validated() {
        let series = TimeSeries::monthly(2020, 1, vec![1.0; 12]).unwrap();

        let zero_horizon = config(date(2020, 3), date(2020, 6), 0);
        assert!(rolling_backtest(&series, &zero_horizon, Naive::new).is_err());

        let beyond = config(date(2030, 1), date(2030, 6), 2);
        assert!(rolling_backtest(&series, &beyond, Naive::new).is_err());

        let inverted = config(date(2020, 6), date(2020, 3), 2);
        assert!(rolling_backtest(&series, &inverted, Naive::new).is_err());
    }
}
