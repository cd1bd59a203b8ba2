// Signal processing error types

use std::fmt;

/// Errors raised by the threshold estimator and segmenter.
///
/// Both components are pure functions over in-memory sample buffers, so
/// every variant signals a malformed input rather than a runtime fault.
/// A recording that fails here should be excluded from the batch and
/// logged, not retried.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalError {
    /// The presumed-silent lead-in is not actually quiet. The recording is
    /// unusable for threshold calibration.
    InvalidSignal {
        std_dev: f64,
        tolerance: f64,
        lead_in_seconds: f64,
    },

    /// A caller requested a lead-in or window length the signal cannot
    /// provide. Failing fast here beats silently truncating the request.
    OutOfRange {
        what: &'static str,
        requested: usize,
        available: usize,
    },
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalError::InvalidSignal {
                std_dev,
                tolerance,
                lead_in_seconds,
            } => write!(
                f,
                "sound data must begin with at least {lead_in_seconds}s of silence \
                 (lead-in std dev {std_dev:.1} exceeds tolerance {tolerance:.1})"
            ),
            SignalError::OutOfRange {
                what,
                requested,
                available,
            } => write!(
                f,
                "{what} of {requested} samples exceeds signal length {available}"
            ),
        }
    }
}

impl std::error::Error for SignalError {}
