//! WAV decoding for dataset recordings.
//!
//! Recordings are uncompressed 16-bit integer PCM, one file per typing
//! session. Capture rigs often record stereo even though the keystroke
//! signal is effectively mono, so multi-channel files are reduced to their
//! first channel rather than rejected.

use std::path::Path;

use crate::error::AudioError;

/// A decoded recording: a mono integer sample sequence at a known rate.
#[derive(Debug, Clone)]
pub struct Recording {
    pub sample_rate: u32,
    pub samples: Vec<i32>,
}

impl Recording {
    /// Recording length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Decode a WAV file into a mono integer sample sequence.
///
/// Fails with a descriptive error if the file cannot be opened, is not
/// 16-bit integer PCM, or its sample stream is corrupt.
pub fn read_wav(path: &Path) -> Result<Recording, AudioError> {
    let reader = hound::WavReader::open(path).map_err(|err| AudioError::OpenFailed {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    let spec = reader.spec();

    match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 16) => {}
        (format, bits) => {
            return Err(AudioError::UnsupportedFormat {
                path: path.to_path_buf(),
                detail: format!("expected 16-bit integer PCM, found {format:?} at {bits} bits"),
            });
        }
    }

    let channels = spec.channels.max(1) as usize;
    let mut samples = Vec::with_capacity(reader.len() as usize / channels);
    for (index, sample) in reader.into_samples::<i16>().enumerate() {
        let value = sample.map_err(|err| AudioError::Malformed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        // Keep channel 0 only
        if index % channels == 0 {
            samples.push(i32::from(value));
        }
    }

    Ok(Recording {
        sample_rate: spec.sample_rate,
        samples,
    })
}
