// ThresholdEstimator - adaptive silence threshold from a trusted lead-in
//
// Every recording in the dataset begins with a stretch of deliberate
// silence. The estimator measures the noise floor of that lead-in (peak
// absolute excursion) and multiplies it by a margin factor to produce the
// amplitude threshold that separates ambient noise from keystroke energy.
//
// The estimator does not locate silence. It trusts the caller that the
// configured lead-in really is silent, and validates that trust by checking
// the lead-in's population standard deviation against a tolerance; a
// recording that fails the check is rejected as a whole.

use crate::config::SegmentationConfig;
use crate::error::SignalError;

/// Estimates the silence threshold of a recording from its silent lead-in.
pub struct ThresholdEstimator {
    sample_rate: u32,
    lead_in_seconds: f64,
    tolerance: f64,
    factor: u32,
}

impl ThresholdEstimator {
    /// Create an estimator with default calibration at the given sample rate
    pub fn new(sample_rate: u32) -> Self {
        Self::with_config(&SegmentationConfig {
            sample_rate,
            ..SegmentationConfig::default()
        })
    }

    /// Create an estimator with explicit calibration parameters
    pub fn with_config(config: &SegmentationConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            lead_in_seconds: config.lead_in_seconds,
            tolerance: config.silence_tolerance,
            factor: config.threshold_factor,
        }
    }

    /// Lead-in window length in samples.
    pub fn lead_in_len(&self) -> usize {
        (self.sample_rate as f64 * self.lead_in_seconds).round() as usize
    }

    /// Estimate the silence threshold of `samples`.
    ///
    /// # Returns
    /// * `Ok(threshold)` - noise floor of the lead-in times the margin factor
    /// * `Err(SignalError::OutOfRange)` - signal shorter than the lead-in
    /// * `Err(SignalError::InvalidSignal)` - lead-in is not actually quiet
    ///
    /// Deterministic given identical input; the signal is never mutated.
    /// A factor of 0 yields threshold 0, making every nonzero sample count
    /// as active.
    pub fn estimate(&self, samples: &[i32]) -> Result<i32, SignalError> {
        let floor = self.noise_floor(samples)?;
        let threshold = (i64::from(floor) * i64::from(self.factor)).min(i64::from(i32::MAX));
        Ok(threshold as i32)
    }

    /// Peak absolute excursion of the validated lead-in window, before the
    /// margin factor is applied.
    pub fn noise_floor(&self, samples: &[i32]) -> Result<i32, SignalError> {
        let lead_in = self.lead_in_len();
        if lead_in > samples.len() {
            return Err(SignalError::OutOfRange {
                what: "lead-in window",
                requested: lead_in,
                available: samples.len(),
            });
        }

        let window = &samples[..lead_in];
        let std_dev = population_std_dev(window);
        if std_dev > self.tolerance {
            return Err(SignalError::InvalidSignal {
                std_dev,
                tolerance: self.tolerance,
                lead_in_seconds: self.lead_in_seconds,
            });
        }

        let max = window.iter().copied().max().unwrap_or(0);
        let min = window.iter().copied().min().unwrap_or(0);
        let floor = i64::from(max).max(i64::from(min).abs());
        Ok(floor as i32)
    }
}

/// Return a copy of `samples` with random noise zeroed out.
///
/// Every sample whose magnitude is strictly below `threshold` is replaced
/// with 0; samples at or above the threshold are preserved. The input is
/// not mutated.
pub fn remove_random_noise(samples: &[i32], threshold: i32) -> Vec<i32> {
    samples
        .iter()
        .map(|&s| {
            if i64::from(s).abs() < i64::from(threshold) {
                0
            } else {
                s
            }
        })
        .collect()
}

fn population_std_dev(window: &[i32]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let n = window.len() as f64;
    let mean = window.iter().map(|&s| f64::from(s)).sum::<f64>() / n;
    let variance = window
        .iter()
        .map(|&s| {
            let d = f64::from(s) - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    variance.sqrt()
}
