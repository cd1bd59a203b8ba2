//! Configuration management for calibration constants
//!
//! The repository history shows the same segmentation logic re-tuned across
//! several calibration runs (keystroke duration, threshold factor). To keep
//! that iteration cheap, every calibration constant is runtime configuration
//! loaded from a JSON file rather than a hard-coded literal.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub segmentation: SegmentationConfig,
    pub collection: CollectionConfig,
}

/// Segmentation pipeline parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Recording sample rate in Hz
    pub sample_rate: u32,
    /// Silent lead-in duration trusted for threshold calibration (seconds)
    pub lead_in_seconds: f64,
    /// Maximum population std dev of the lead-in before the recording is
    /// rejected as not-silent (amplitude units)
    pub silence_tolerance: f64,
    /// Margin multiplied onto the lead-in noise floor
    pub threshold_factor: u32,
    /// Duration of a single keystroke's acoustic signature (seconds)
    pub keystroke_duration_seconds: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            lead_in_seconds: 5.0,
            silence_tolerance: 40.0,
            // Keystroke transients sit roughly an order of magnitude above
            // ambient noise on consumer microphones; 11x trades missed quiet
            // strokes against background-noise false positives.
            threshold_factor: 11,
            keystroke_duration_seconds: 0.3,
        }
    }
}

impl SegmentationConfig {
    /// Fixed output window length `L` in samples.
    pub fn window_len(&self) -> usize {
        (self.sample_rate as f64 * self.keystroke_duration_seconds).round() as usize
    }
}

/// Batch collection driver parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Key labels to collect; each maps to a subdirectory of the dataset
    pub keys: Vec<String>,
    /// Worker threads for per-file segmentation (0 = available parallelism)
    pub workers: usize,
    /// Windows with a shorter active region are counted as degenerate
    pub min_active_samples: usize,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        let mut keys: Vec<String> = ('a'..='z').map(|c| c.to_string()).collect();
        keys.extend(["space", "period", "enter"].map(String::from));
        Self {
            keys,
            workers: 0,
            min_active_samples: 100,
        }
    }
}

impl Default for AppConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            segmentation: SegmentationConfig::default(),
            collection: CollectionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file.
    ///
    /// Falls back to defaults if the file is missing or invalid; a bad
    /// config file should never keep a collection run from starting.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}
