// Keystroke store error types

use std::fmt;

/// Errors raised by the keystroke store.
#[derive(Debug)]
pub enum StorageError {
    /// A record's content digest collides with one already persisted. The
    /// batch is rolled back; duplicates are rejected, never overwritten.
    DuplicateDigest { key_type: String, digest: i64 },

    /// Underlying database failure.
    Database(rusqlite::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::DuplicateDigest { key_type, digest } => write!(
                f,
                "duplicate keystroke digest {digest} for key '{key_type}' (batch rolled back)"
            ),
            StorageError::Database(err) => write!(f, "database error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Database(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Database(err)
    }
}
