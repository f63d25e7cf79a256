//! Differencing and integration helpers for the ARIMA backend.

/// Difference a series `d` times.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Undo `d` rounds of differencing on a forecast.
///
/// `history` is the undifferenced series the forecast continues from; its
/// trailing values seed the cumulative sums at each integration level.
pub fn integrate(forecast_diff: &[f64], history: &[f64], d: usize) -> Vec<f64> {
    if d == 0 || forecast_diff.is_empty() {
        return forecast_diff.to_vec();
    }

    let mut result = forecast_diff.to_vec();
    for level in (0..d).rev() {
        let seed = if level == 0 {
            history.last().copied().unwrap_or(0.0)
        } else {
            difference(history, level).last().copied().unwrap_or(0.0)
        };

        let mut cumsum = seed;
        for value in &mut result {
            cumsum += *value;
            *value = cumsum;
        }
    }
    result
}

/// Binomial coefficient C(n, k) as f64. Orders here are tiny.
pub fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut result = 1.0;
    for i in 0..k {
        result = result * (n - i) as f64 / (i + 1) as f64;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_difference() {
        assert_eq!(difference(&[1.0, 3.0, 6.0, 10.0], 1), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn second_difference() {
        assert_eq!(difference(&[1.0, 3.0, 6.0, 10.0], 2), vec![1.0, 1.0]);
    }

    #[test]
    fn zero_difference_is_identity() {
        assert_eq!(difference(&[1.0, 2.0], 0), vec![1.0, 2.0]);
    }

    #[test]
    fn difference_collapses_short_input() {
        assert!(difference(&[1.0], 1).is_empty());
        assert!(difference(&[1.0, 2.0], 3).is_empty());
    }

    #[test]
    fn integrate_reverses_difference_d1() {
        let original = vec![1.0, 3.0, 6.0, 10.0];
        // Pretend the next two differences are 5 and 6.
        let restored = integrate(&[5.0, 6.0], &original, 1);
        assert_eq!(restored, vec![15.0, 21.0]);
    }

    #[test]
    fn integrate_reverses_difference_d2() {
        // Series with constant second difference 1.
        let original = vec![1.0, 3.0, 6.0, 10.0];
        let diff2 = difference(&original, 2);
        assert_eq!(diff2, vec![1.0, 1.0]);

        // Forecasting second differences of 1 continues the pattern 15, 21.
        let restored = integrate(&[1.0, 1.0], &original, 2);
        assert_relative_eq!(restored[0], 15.0, epsilon = 1e-12);
        assert_relative_eq!(restored[1], 21.0, epsilon = 1e-12);
    }

    #[test]
    fn binomial_small_orders() {
        assert_relative_eq!(binomial(2, 0), 1.0);
        assert_relative_eq!(binomial(2, 1), 2.0);
        assert_relative_eq!(binomial(3, 2), 3.0);
        assert_relative_eq!(binomial(1, 2), 0.0);
    }
}
