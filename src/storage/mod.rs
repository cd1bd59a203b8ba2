//! SQLite-backed keystroke storage.
//!
//! Collected keystroke windows are persisted with a uniqueness constraint
//! on their content digest so the same capture never enters the training
//! set twice. The store is an explicitly constructed handle with explicit
//! lifecycle - opened against a path (or in memory for tests), closed on
//! drop - rather than a process-wide engine.

use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::StorageError;

/// One labeled keystroke ready for persistence or training.
#[derive(Debug, Clone, PartialEq)]
pub struct KeystrokeRecord {
    /// Key label, e.g. "a" or "space"
    pub key_type: String,
    /// Deterministic fingerprint of the waveform prefix
    pub sound_digest: i64,
    /// Fixed-length, zero-padded waveform
    pub sound_data: Vec<i32>,
}

/// Handle to a keystroke database.
pub struct KeystrokeStore {
    conn: Connection,
}

impl KeystrokeStore {
    /// Open (creating if needed) a store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS keystrokes (
                id           INTEGER PRIMARY KEY,
                key_type     TEXT NOT NULL,
                sound_digest INTEGER NOT NULL UNIQUE,
                sound_data   BLOB NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Persist a batch of records in one transaction.
    ///
    /// A record whose digest already exists (in the store or earlier in the
    /// batch) rejects the whole batch: the transaction is rolled back and
    /// `StorageError::DuplicateDigest` names the collision. Nothing is
    /// overwritten.
    pub fn insert_all(&mut self, records: &[KeystrokeRecord]) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        for record in records {
            let result = tx.execute(
                "INSERT INTO keystrokes (key_type, sound_digest, sound_data)
                 VALUES (?1, ?2, ?3)",
                params![
                    record.key_type,
                    record.sound_digest,
                    samples_to_blob(&record.sound_data)
                ],
            );
            match result {
                Ok(_) => {}
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    // Dropping the transaction rolls the batch back
                    return Err(StorageError::DuplicateDigest {
                        key_type: record.key_type.clone(),
                        digest: record.sound_digest,
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }
        tx.commit()?;
        tracing::info!("[Store] Persisted {} keystrokes", records.len());
        Ok(records.len())
    }

    /// Retrieve every stored record, label-annotated, in insertion order.
    pub fn load_all(&self) -> Result<Vec<KeystrokeRecord>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key_type, sound_digest, sound_data FROM keystrokes ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            let blob: Vec<u8> = row.get(2)?;
            Ok(KeystrokeRecord {
                key_type: row.get(0)?,
                sound_digest: row.get(1)?,
                sound_data: blob_to_samples(&blob),
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Per-label record counts, ordered by label.
    pub fn count_by_key(&self) -> Result<Vec<(String, usize)>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT key_type, COUNT(*) FROM keystrokes GROUP BY key_type ORDER BY key_type",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }
}

fn samples_to_blob(samples: &[i32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(samples.len() * 4);
    for sample in samples {
        blob.extend_from_slice(&sample.to_le_bytes());
    }
    blob
}

fn blob_to_samples(blob: &[u8]) -> Vec<i32> {
    blob.chunks_exact(4)
        .map(|chunk| i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
