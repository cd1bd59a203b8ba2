// Signal module - segmentation pipeline for keystroke extraction
//
// This module turns a buffered mono recording into a sequence of
// fixed-length keystroke windows:
//
// 1. ThresholdEstimator derives an amplitude threshold separating silence
//    from keystroke energy, calibrated on the recording's silent lead-in.
// 2. Segmenter scans the signal once, finds threshold crossings, corrects
//    window boundaries that overrun into a neighboring keystroke, and emits
//    zero-padded windows of a fixed length.
//
// Data flows one way: raw signal -> threshold -> ordered windows. Both
// stages are pure functions over in-memory buffers; nothing here touches
// I/O or retains state between invocations.

pub mod segmenter;
pub mod threshold;

pub use segmenter::{KeystrokeWindow, Segmenter};
pub use threshold::{remove_random_noise, ThresholdEstimator};

use crate::config::SegmentationConfig;
use crate::error::SignalError;

/// Run the full pipeline over one recording: estimate the silence threshold
/// from the lead-in, then segment the signal into keystroke windows.
pub fn segment_recording(
    samples: &[i32],
    config: &SegmentationConfig,
) -> Result<Vec<KeystrokeWindow>, SignalError> {
    let threshold = ThresholdEstimator::with_config(config).estimate(samples)?;
    tracing::debug!(
        "[Signal] Estimated silence threshold {} over {:.1}s lead-in",
        threshold,
        config.lead_in_seconds
    );
    Segmenter::with_config(config).segment(samples, threshold)
}
