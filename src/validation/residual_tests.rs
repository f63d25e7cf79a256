//! Residual diagnostics for fitted models.

use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::utils::stats::{autocorrelation, mean};

/// Ljung-Box test result.
#[derive(Debug, Clone)]
pub struct LjungBoxResult {
    /// Q statistic.
    pub statistic: f64,
    /// P-value from the chi-squared distribution.
    pub p_value: f64,
    /// Lags included in the statistic.
    pub lags: usize,
    /// Degrees of freedom (lags minus fitted parameters, at least 1).
    pub df: usize,
}

impl LjungBoxResult {
    /// Whether the residuals pass as white noise at significance `alpha`
    /// (i.e. the null of no autocorrelation is not rejected).
    pub fn is_white_noise(&self, alpha: f64) -> bool {
        self.p_value > alpha
    }
}

/// Ljung-Box portmanteau test for autocorrelation in residuals.
///
/// `fitted_params` adjusts the degrees of freedom for parameters the
/// model estimated from the same data (p + q for an ARMA fit). Default
/// lag count is `min(10, n / 5)`.
pub fn ljung_box(residuals: &[f64], lags: Option<usize>, fitted_params: usize) -> LjungBoxResult {
    let n = residuals.len();
    if n < 4 {
        return LjungBoxResult {
            statistic: f64::NAN,
            p_value: f64::NAN,
            lags: 0,
            df: 0,
        };
    }

    let lags = lags.unwrap_or_else(|| 10.min(n / 5).max(1)).clamp(1, n - 1);

    // Center once; autocorrelation() re-centers but that is harmless.
    let centered: Vec<f64> = {
        let m = mean(residuals);
        residuals.iter().map(|r| r - m).collect()
    };

    let mut statistic = 0.0;
    for k in 1..=lags {
        let rho = autocorrelation(&centered, k);
        if !rho.is_finite() {
            continue;
        }
        statistic += rho * rho / (n - k) as f64;
    }
    statistic *= n as f64 * (n as f64 + 2.0);

    let df = lags.saturating_sub(fitted_params).max(1);
    let p_value = match ChiSquared::new(df as f64) {
        Ok(dist) => 1.0 - dist.cdf(statistic),
        Err(_) => f64::NAN,
    };

    LjungBoxResult {
        statistic,
        p_value,
        lags,
        df,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lcg_noise(n: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5
            })
            .collect()
    }

    #[test]
    fn white_noise_passes() {
        let residuals = lcg_noise(200, 41);
        let result = ljung_box(&residuals, Some(10), 0);
        assert!(
            result.is_white_noise(0.05),
            "Q = {}, p = {}",
            result.statistic,
            result.p_value
        );
    }

    #[test]
    fn autocorrelated_residuals_fail() {
        // A slow sine is heavily autocorrelated at small lags.
        let residuals: Vec<f64> = (0..200).map(|i| (i as f64 * 0.1).sin()).collect();
        let result = ljung_box(&residuals, Some(10), 0);
        assert!(!result.is_white_noise(0.05), "p = {}", result.p_value);
    }

    #[test]
    fn degrees_of_freedom_account_for_fitted_params() {
        let residuals = lcg_noise(100, 43);
        let result = ljung_box(&residuals, Some(10), 3);
        assert_eq!(result.df, 7);

        // Never collapses to zero.
        let result = ljung_box(&residuals, Some(2), 5);
        assert_eq!(result.df, 1);
    }

    #[test]
    fn tiny_input_is_undecided() {
        let result = ljung_box(&[0.1, -0.1], None, 0);
        assert!(result.statistic.is_nan());
    }
}
