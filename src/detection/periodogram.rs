//! Periodogram for cyclic-behavior screening.
//!
//! Power spectrum of the series via FFT. Used before modeling to check
//! whether a monthly series carries a dominant cycle worth a seasonal
//! treatment.

use rustfft::{num_complex::Complex64, FftPlanner};

/// One spectral estimate: frequency (in cycles per unit of
/// `sampling_frequency`) and its power.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPoint {
    /// Frequency of the bin.
    pub frequency: f64,
    /// Power spectral density estimate.
    pub power: f64,
}

/// Compute the one-sided periodogram of a series.
///
/// The series is demeaned first so the DC component does not swamp the
/// spectrum; bins run from the fundamental up to the Nyquist frequency.
/// For monthly data sampled once per month, `sampling_frequency = 1.0`
/// puts frequencies in cycles per month.
pub fn periodogram(values: &[f64], sampling_frequency: f64) -> Vec<SpectralPoint> {
    let n = values.len();
    if n < 4 || sampling_frequency <= 0.0 {
        return Vec::new();
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let mut buffer: Vec<Complex64> = values
        .iter()
        .map(|&x| Complex64::new(x - mean, 0.0))
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let n_f64 = n as f64;
    buffer
        .iter()
        .enumerate()
        .skip(1)
        .take(n / 2)
        .map(|(k, value)| SpectralPoint {
            frequency: k as f64 * sampling_frequency / n_f64,
            power: (value.re * value.re + value.im * value.im) / n_f64,
        })
        .collect()
}

/// The highest-power spectral point, if any.
pub fn peak(spectrum: &[SpectralPoint]) -> Option<SpectralPoint> {
    spectrum
        .iter()
        .copied()
        .max_by(|a, b| a.power.partial_cmp(&b.power).unwrap_or(std::cmp::Ordering::Equal))
}
