// Audio decoding error types

use std::fmt;
use std::path::PathBuf;

/// Errors raised while decoding a WAV recording into a sample buffer.
///
/// Recordings are expected to be uncompressed 16-bit integer PCM, matching
/// the capture rigs the datasets were recorded with.
#[derive(Debug)]
pub enum AudioError {
    /// The file could not be opened or is not a parseable WAV container.
    OpenFailed { path: PathBuf, reason: String },

    /// The file decoded but is not the expected sample format.
    UnsupportedFormat { path: PathBuf, detail: String },

    /// The sample stream ended in a decode error partway through.
    Malformed { path: PathBuf, reason: String },
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::OpenFailed { path, reason } => {
                write!(f, "failed to open {}: {reason}", path.display())
            }
            AudioError::UnsupportedFormat { path, detail } => {
                write!(f, "unsupported format in {}: {detail}", path.display())
            }
            AudioError::Malformed { path, reason } => {
                write!(f, "malformed audio in {}: {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for AudioError {}
