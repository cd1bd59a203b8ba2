// Error types for the keystroke capture pipeline
//
// This module defines the error taxonomy for signal processing, audio
// decoding, and keystroke storage. Core errors are raised synchronously on
// malformed single-file input; the batch collection driver is responsible
// for catching per-file errors and continuing with the rest of the queue.

mod audio;
mod signal;
mod storage;

pub use audio::AudioError;
pub use signal::SignalError;
pub use storage::StorageError;
