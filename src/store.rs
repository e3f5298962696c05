use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};

use crate::error::Result;
use crate::models::RecordingId;

/// Persistent inverted index mapping `hash -> (recording_id, anchor_offset)`,
/// per §4.5/§6.
///
/// A single `rusqlite::Connection` behind a `Mutex`: `Connection` is not
/// `Sync`, and §5 specifies a single-writer discipline on the index anyway,
/// so the mutex *is* the serialization point concurrent ingest workers
/// funnel through. Reads go through the same lock; SQLite's own
/// file-level locking is what would otherwise allow concurrent readers,
/// but the pool in front of this store is sized for simplicity over
/// maximum read concurrency.
pub struct FingerprintStore {
    conn: Mutex<Connection>,
}

impl FingerprintStore {
    /// Opens (creating if absent) the index file at `path` and ensures the
    /// schema from §6 exists: `fingerprints(hash, file_name, offset)` with
    /// a secondary index on `hash`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS fingerprints (
                hash TEXT NOT NULL,
                file_name TEXT NOT NULL,
                offset INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_hash ON fingerprints (hash);",
        )?;
        Ok(FingerprintStore {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory index, used by tests that don't want a file on disk.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE fingerprints (
                hash TEXT NOT NULL,
                file_name TEXT NOT NULL,
                offset INTEGER NOT NULL
            );
            CREATE INDEX idx_hash ON fingerprints (hash);",
        )?;
        Ok(FingerprintStore {
            conn: Mutex::new(conn),
        })
    }

    /// Appends `rows` as one batch. One transaction per call — per §4.5,
    /// atomicity is required per insert batch, not across batches.
    pub fn insert_many(&self, recording_id: &str, rows: &[(String, usize)]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.lock().expect("fingerprint store mutex poisoned");
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO fingerprints (hash, file_name, offset) VALUES (?1, ?2, ?3)",
            )?;
            for (hash, offset) in rows {
                stmt.execute(params![hash, recording_id, *offset as i64])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Removes all rows for `recording_id` — the "replace" half of
    /// replace-ingest (§4.6 step 2a); must strictly precede the matching
    /// `insert_many` call (§5 ordering guarantee).
    pub fn delete_by_recording(&self, recording_id: &str) -> Result<()> {
        let conn = self.conn.lock().expect("fingerprint store mutex poisoned");
        conn.execute(
            "DELETE FROM fingerprints WHERE file_name = ?1",
            params![recording_id],
        )?;
        Ok(())
    }

    /// Returns every `(hash, recording_id)` row matching any hash in
    /// `hashes`. Callers are responsible for chunking `hashes` to at most
    /// `query_chunk_size` per call (§4.5 "query chunking").
    pub fn lookup(&self, hashes: &[String]) -> Result<Vec<(String, RecordingId)>> {
        if hashes.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock().expect("fingerprint store mutex poisoned");
        let placeholders = std::iter::repeat("?")
            .take(hashes.len())
            .collect::<Vec<_>>()
            .join(",");
        let sql = format!(
            "SELECT hash, file_name FROM fingerprints WHERE hash IN ({})",
            placeholders
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(hashes.iter()),
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Into::into)
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.conn.lock().expect("fingerprint store mutex poisoned");
        conn.query_row("SELECT COUNT(*) FROM fingerprints", [], |row| row.get(0))
            .map_err(Into::into)
    }

    pub fn count_distinct_recordings(&self) -> Result<i64> {
        let conn = self.conn.lock().expect("fingerprint store mutex poisoned");
        conn.query_row(
            "SELECT COUNT(DISTINCT file_name) FROM fingerprints",
            [],
            |row| row.get(0),
        )
        .map_err(Into::into)
    }

    pub fn sample_recordings(&self, n: usize) -> Result<Vec<RecordingId>> {
        let conn = self.conn.lock().expect("fingerprint store mutex poisoned");
        let sql = format!("SELECT DISTINCT file_name FROM fingerprints LIMIT {}", n);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Into::into)
    }
}
