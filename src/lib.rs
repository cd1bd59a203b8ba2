// Keytap - acoustic keystroke capture pipeline
//
// Segments raw recordings of keyboard typing into fixed-length
// per-keystroke waveform windows, labels them by dataset directory, and
// persists them for classifier training.

// Module declarations
pub mod audio;
pub mod collect;
pub mod config;
pub mod digest;
pub mod error;
pub mod signal;
pub mod storage;

// Re-exports for convenience
pub use collect::{CollectionReport, Collector, IgnoreMap};
pub use config::{AppConfig, CollectionConfig, SegmentationConfig};
pub use error::{AudioError, SignalError, StorageError};
pub use signal::{KeystrokeWindow, Segmenter, ThresholdEstimator};
pub use storage::{KeystrokeRecord, KeystrokeStore};
