//! Stationarity tests and the differencing decision.
//!
//! ADF tests the unit-root null (rejection means stationary); KPSS tests
//! the stationarity null (rejection means non-stationary). The two point
//! in opposite directions, so the differencing decision wants agreement
//! from both.

use crate::models::arima::difference;
use crate::utils::stats::mean;

/// Critical values at common significance levels.
#[derive(Debug, Clone, Copy, Default)]
pub struct CriticalValues {
    /// 1% significance.
    pub cv_1pct: f64,
    /// 5% significance.
    pub cv_5pct: f64,
    /// 10% significance.
    pub cv_10pct: f64,
}

/// Result of a stationarity hypothesis test.
#[derive(Debug, Clone)]
pub struct StationarityResult {
    /// Test statistic.
    pub statistic: f64,
    /// Approximate p-value.
    pub p_value: f64,
    /// Lags used.
    pub lags: usize,
    /// Whether the series looks stationary at the 5% level.
    pub is_stationary: bool,
    /// Critical values of the test distribution.
    pub critical_values: CriticalValues,
}

impl StationarityResult {
    fn undecided(lags: usize, critical_values: CriticalValues) -> Self {
        Self {
            statistic: f64::NAN,
            p_value: f64::NAN,
            lags,
            is_stationary: false,
            critical_values,
        }
    }
}

/// Augmented Dickey-Fuller test with a constant term.
///
/// Regresses the first difference on the lagged level; a strongly
/// negative t-statistic rejects the unit root. The lag start offset is
/// selected by AIC over `1..=max_lags` (default `(n-1)^(1/3)`).
pub fn adf_test(series: &[f64], max_lags: Option<usize>) -> StationarityResult {
    // MacKinnon critical values for the constant-only case.
    let critical_values = CriticalValues {
        cv_1pct: -3.43,
        cv_5pct: -2.86,
        cv_10pct: -2.57,
    };

    let n = series.len();
    if n < 8 {
        return StationarityResult::undecided(0, critical_values);
    }

    let max_lags = max_lags
        .unwrap_or_else(|| ((n - 1) as f64).powf(1.0 / 3.0).floor() as usize)
        .clamp(1, n / 2 - 2);

    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();
    let level = &series[..n - 1];

    // Pick the lag offset whose regression minimizes AIC.
    let mut best_lag = 1;
    let mut best_aic = f64::INFINITY;
    for lag in 1..=max_lags {
        if let Some((_, _, rss, used)) = level_regression(&diff, level, lag) {
            if rss > 0.0 && used > 3 {
                let k = 2.0;
                let aic = used as f64 * (rss / used as f64).ln() + 2.0 * k;
                if aic < best_aic {
                    best_aic = aic;
                    best_lag = lag;
                }
            }
        }
    }

    let Some((beta, se, _, _)) = level_regression(&diff, level, best_lag) else {
        return StationarityResult::undecided(best_lag, critical_values);
    };
    if se == 0.0 || !se.is_finite() {
        return StationarityResult::undecided(best_lag, critical_values);
    }

    let t_stat = beta / se;
    let p_value = adf_p_value(t_stat);
    let is_stationary = t_stat < critical_values.cv_5pct;

    StationarityResult {
        statistic: t_stat,
        p_value,
        lags: best_lag,
        is_stationary,
        critical_values,
    }
}

/// OLS of `diff[t] = alpha + beta * level[t]` over `t >= start`.
/// Returns (beta, se_beta, rss, observations used).
fn level_regression(
    diff: &[f64],
    level: &[f64],
    start: usize,
) -> Option<(f64, f64, f64, usize)> {
    let m = diff.len().min(level.len());
    if m <= start + 3 {
        return None;
    }
    let used = m - start;

    let y_mean = mean(&diff[start..m]);
    let x_mean = mean(&level[start..m]);

    let mut xx = 0.0;
    let mut xy = 0.0;
    let mut yy = 0.0;
    for t in start..m {
        let x = level[t] - x_mean;
        let y = diff[t] - y_mean;
        xx += x * x;
        xy += x * y;
        yy += y * y;
    }
    if xx == 0.0 {
        return None;
    }

    let beta = xy / xx;
    let rss = (yy - beta * xy).max(0.0);
    let sigma_sq = rss / (used.saturating_sub(2)) as f64;
    if sigma_sq <= 0.0 || !sigma_sq.is_finite() {
        return None;
    }
    let se = (sigma_sq / xx).sqrt();
    Some((beta, se, rss, used))
}

/// Interpolated p-value from the MacKinnon tau table (constant case).
fn adf_p_value(t_stat: f64) -> f64 {
    if t_stat.is_nan() {
        return f64::NAN;
    }
    const TABLE: &[(f64, f64)] = &[
        (-4.0, 0.001),
        (-3.43, 0.01),
        (-2.86, 0.05),
        (-2.57, 0.10),
        (-1.94, 0.20),
        (-1.62, 0.30),
        (-1.28, 0.40),
        (-0.84, 0.50),
        (0.0, 0.70),
    ];
    if t_stat <= TABLE[0].0 {
        return TABLE[0].1;
    }
    for pair in TABLE.windows(2) {
        let (t0, p0) = pair[0];
        let (t1, p1) = pair[1];
        if t_stat <= t1 {
            let w = (t_stat - t0) / (t1 - t0);
            return p0 + w * (p1 - p0);
        }
    }
    0.90
}

/// KPSS test for level stationarity.
///
/// The null is stationarity: a statistic above the critical value rejects
/// it. The long-run variance uses a Bartlett-kernel HAC estimate with
/// `4 * (n/100)^(1/4)` lags by default.
pub fn kpss_test(series: &[f64], lags: Option<usize>) -> StationarityResult {
    let critical_values = CriticalValues {
        cv_1pct: 0.739,
        cv_5pct: 0.463,
        cv_10pct: 0.347,
    };

    let n = series.len();
    if n < 8 {
        return StationarityResult::undecided(0, critical_values);
    }

    let lags = lags
        .unwrap_or_else(|| (4.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize)
        .clamp(1, n / 2);

    let series_mean = mean(series);
    let residuals: Vec<f64> = series.iter().map(|x| x - series_mean).collect();

    let mut cumulative = 0.0;
    let mut numerator = 0.0;
    for &r in &residuals {
        cumulative += r;
        numerator += cumulative * cumulative;
    }
    numerator /= (n * n) as f64;

    // Bartlett-weighted long-run variance.
    let mut long_run_var = residuals.iter().map(|r| r * r).sum::<f64>() / n as f64;
    for j in 1..=lags {
        let weight = 1.0 - j as f64 / (lags + 1) as f64;
        let autocov: f64 = residuals[j..]
            .iter()
            .zip(residuals.iter())
            .map(|(a, b)| a * b)
            .sum::<f64>()
            / n as f64;
        long_run_var += 2.0 * weight * autocov;
    }

    if long_run_var <= 0.0 || !long_run_var.is_finite() {
        // A degenerate (constant) series is trivially stationary.
        return StationarityResult {
            statistic: 0.0,
            p_value: 0.10,
            lags,
            is_stationary: true,
            critical_values,
        };
    }

    let statistic = numerator / long_run_var;
    let p_value = kpss_p_value(statistic);
    let is_stationary = statistic < critical_values.cv_5pct;

    StationarityResult {
        statistic,
        p_value,
        lags,
        is_stationary,
        critical_values,
    }
}

fn kpss_p_value(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic < 0.347 {
        0.10 + 0.90 * (1.0 - statistic / 0.347)
    } else if statistic < 0.463 {
        0.05 + 0.05 * (0.463 - statistic) / (0.463 - 0.347)
    } else if statistic < 0.739 {
        0.01 + 0.04 * (0.739 - statistic) / (0.739 - 0.463)
    } else {
        0.01
    }
}

/// Both tests applied to one differencing level.
#[derive(Debug, Clone)]
pub struct StationarityCheck {
    /// Differencing order tested.
    pub d: usize,
    /// ADF outcome.
    pub adf: StationarityResult,
    /// KPSS outcome.
    pub kpss: StationarityResult,
}

impl StationarityCheck {
    /// Whether both tests agree the differenced series is stationary.
    pub fn agree_stationary(&self) -> bool {
        self.adf.is_stationary && self.kpss.is_stationary
    }
}

/// Outcome of the differencing decision.
#[derive(Debug, Clone)]
pub struct DifferencingDecision {
    /// Selected differencing order.
    pub d: usize,
    /// Per-order test results, in the order they were tried.
    pub checks: Vec<StationarityCheck>,
}

/// Decide the differencing order by testing the level and successive
/// differences until ADF and KPSS agree on stationarity.
///
/// Falls back to the smallest order ADF alone accepts, and to `max_d`
/// when neither test ever accepts.
pub fn decide_differencing(values: &[f64], max_d: usize) -> DifferencingDecision {
    let mut checks = Vec::new();

    for d in 0..=max_d {
        let differenced = difference(values, d);
        if differenced.len() < 8 {
            break;
        }
        let check = StationarityCheck {
            d,
            adf: adf_test(&differenced, None),
            kpss: kpss_test(&differenced, None),
        };
        let decided = check.agree_stationary();
        checks.push(check);
        if decided {
            return DifferencingDecision { d, checks };
        }
    }

    let fallback = checks
        .iter()
        .find(|c| c.adf.is_stationary)
        .map(|c| c.d)
        .unwrap_or(max_d);
    DifferencingDecision {
        d: fallback,
        checks,
    }
}
