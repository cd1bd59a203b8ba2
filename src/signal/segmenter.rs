// Segmenter - single-pass keystroke extraction with overrun correction
//
// Scans the signal left to right and cuts one fixed-length window per
// detected keystroke:
//
// 1. L = round(sample_rate * keystroke_duration_seconds) is the fixed
//    output window length.
// 2. An onset is the first index a where |signal[a]| exceeds the threshold
//    (strictly: a sample exactly at the threshold is silence).
// 3. The window provisionally ends at b = min(a + L, len). If signal[b] is
//    itself above threshold the fixed window has likely run into the next
//    keystroke's rising edge, so b walks backward until the value drops to
//    or under the threshold, or b has retreated all the way to a + 1.
// 4. signal[a..b] is emitted right-padded with zeros to exactly L samples.
// 5. The scan resumes at b, so windows never overlap and are emitted in
//    signal order.
//
// The scan never looks backward past a: a keystroke's attack transient that
// started before the threshold crossing is truncated. That is accepted
// signal loss, not a defect.

use crate::config::SegmentationConfig;
use crate::error::SignalError;

/// One extracted keystroke: a fixed-length, zero-padded waveform slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystrokeWindow {
    /// Waveform samples, always exactly the configured window length
    pub samples: Vec<i32>,
    /// Index of the onset sample in the source signal
    pub onset: usize,
    /// Length of the active (non-padding) prefix; the window's backing
    /// range in the source signal is `onset .. onset + active_len`
    pub active_len: usize,
}

impl KeystrokeWindow {
    /// Number of trailing zero samples appended to reach the fixed length.
    pub fn padding_len(&self) -> usize {
        self.samples.len() - self.active_len
    }
}

/// Cuts fixed-length keystroke windows out of a recording.
pub struct Segmenter {
    sample_rate: u32,
    keystroke_duration_seconds: f64,
}

impl Segmenter {
    /// Create a segmenter with the default keystroke duration
    pub fn new(sample_rate: u32) -> Self {
        Self::with_config(&SegmentationConfig {
            sample_rate,
            ..SegmentationConfig::default()
        })
    }

    /// Create a segmenter with explicit calibration parameters
    pub fn with_config(config: &SegmentationConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            keystroke_duration_seconds: config.keystroke_duration_seconds,
        }
    }

    /// Fixed output window length `L` in samples.
    pub fn window_len(&self) -> usize {
        (self.sample_rate as f64 * self.keystroke_duration_seconds).round() as usize
    }

    /// Extract every keystroke window from `samples`.
    ///
    /// # Arguments
    /// * `samples` - full buffered recording, never mutated
    /// * `threshold` - silence threshold, typically from ThresholdEstimator
    ///
    /// # Returns
    /// Windows in left-to-right signal order, each exactly `window_len()`
    /// samples long. An empty signal yields an empty vector; a window
    /// length of zero or one exceeding the signal length is rejected with
    /// `SignalError::OutOfRange`.
    pub fn segment(
        &self,
        samples: &[i32],
        threshold: i32,
    ) -> Result<Vec<KeystrokeWindow>, SignalError> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let window_len = self.window_len();
        if window_len == 0 || window_len > samples.len() {
            return Err(SignalError::OutOfRange {
                what: "keystroke window",
                requested: window_len,
                available: samples.len(),
            });
        }

        let gate = i64::from(threshold);
        let len = samples.len();
        let mut windows = Vec::new();
        let mut i = 0usize;

        while i < len {
            if i64::from(samples[i]).abs() <= gate {
                i += 1;
                continue;
            }

            let a = i;
            let mut b = (a + window_len).min(len);

            // Overrun correction: the fixed window likely straddles the
            // next keystroke if its end lands on an active sample. Retreat
            // the boundary, but never past a + 1 - the loop can therefore
            // stop with samples[a + 1] still above threshold, leaving an
            // active sample exactly at the new boundary.
            if b < len && i64::from(samples[b]).abs() > gate {
                while b > a + 1 && i64::from(samples[b]).abs() > gate {
                    b -= 1;
                }
            }

            let mut window = Vec::with_capacity(window_len);
            window.extend_from_slice(&samples[a..b]);
            window.resize(window_len, 0);
            windows.push(KeystrokeWindow {
                samples: window,
                onset: a,
                active_len: b - a,
            });

            // Resume immediately after the emitted window
            i = b;
        }

        Ok(windows)
    }
}

#[cfg(test)]
#[path = "segmenter_tests.rs"]
mod tests;
