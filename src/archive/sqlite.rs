//! SQLite archive implementation
//!
//! This module provides a SQLite-based implementation of the ArchiveStore
//! trait. Each commit is a single transaction, and the connection runs with
//! `synchronous = FULL` so a returned commit survives power loss.

use crate::archive::schema::initialize_schema;
use crate::archive::traits::{ArchiveError, ArchiveResult, ArchiveStore};
use crate::archive::{DocumentMeta, RunParams, RunRecord, SegmentRecord, StoredDocument};
use crate::extract::Record;
use crate::state::RunStatus;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite archive backend
pub struct SqliteArchive {
    conn: Connection,
}

impl SqliteArchive {
    /// Opens or creates an archive at `path`
    ///
    /// Missing parent directories are created.
    pub fn new(path: &Path) -> ArchiveResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = FULL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory archive (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> ArchiveResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        start_id: row.get::<_, i64>(4)? as u64,
        count: row.get::<_, i64>(5)? as u64,
        chunk_size: row.get::<_, i64>(6)? as usize,
        commit_every: row.get::<_, i64>(7)? as usize,
        status: RunStatus::from_db_string(&row.get::<_, String>(8)?)
            .unwrap_or(RunStatus::Failed),
    })
}

/// Document ids are stored as SQLite INTEGER, so they must fit in `i64`
fn storable_id(id: u64) -> ArchiveResult<i64> {
    i64::try_from(id)
        .map_err(|_| ArchiveError::InvalidData(format!("id {} does not fit the archive", id)))
}

const RUN_COLUMNS: &str =
    "id, started_at, finished_at, config_hash, start_id, id_count, chunk_size, commit_every, status";

impl ArchiveStore for SqliteArchive {
    // ===== Run Management =====

    fn create_run(&mut self, params: &RunParams) -> ArchiveResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, start_id, id_count, chunk_size, commit_every, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                now,
                params.config_hash,
                storable_id(params.start_id)?,
                storable_id(params.count)?,
                params.chunk_size as i64,
                params.commit_every as i64,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> ArchiveResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(ArchiveError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> ArchiveResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(ArchiveError::RunNotFound(run_id))
    }

    fn list_runs(&self) -> ArchiveResult<Vec<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id ASC", RUN_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let runs = stmt
            .query_map([], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }

    // ===== Segments =====

    fn commit_segment(&mut self, run_id: i64, records: &[Record]) -> ArchiveResult<i64> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO segments (run_id, committed_at, record_count) VALUES (?1, ?2, ?3)",
            params![run_id, now, records.len() as i64],
        )?;
        let segment_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO documents (segment_id, doc_id, views, comments, likes, text)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for record in records {
                stmt.execute(params![
                    segment_id,
                    storable_id(record.id())?,
                    record.views(),
                    record.comments(),
                    record.likes(),
                    record.text()
                ])?;
            }
        }

        tx.commit()?;
        Ok(segment_id)
    }

    fn list_segments(&self) -> ArchiveResult<Vec<SegmentRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, committed_at, record_count FROM segments ORDER BY id ASC",
        )?;

        let segments = stmt
            .query_map([], |row| {
                Ok(SegmentRecord {
                    id: row.get(0)?,
                    run_id: row.get(1)?,
                    committed_at: row.get(2)?,
                    record_count: row.get::<_, i64>(3)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(segments)
    }

    fn read_segment(&self, segment_id: i64) -> ArchiveResult<Vec<StoredDocument>> {
        let mut stmt = self.conn.prepare(
            "SELECT doc_id, views, comments, likes, text FROM documents
             WHERE segment_id = ?1 ORDER BY id ASC",
        )?;

        let documents = stmt
            .query_map(params![segment_id], |row| {
                Ok(StoredDocument {
                    text: row.get(4)?,
                    meta: DocumentMeta {
                        id: row.get::<_, i64>(0)? as u64,
                        views: row.get(1)?,
                        comments: row.get(2)?,
                        likes: row.get(3)?,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(documents)
    }

    // ===== Statistics =====

    fn count_documents(&self) -> ArchiveResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn highest_committed_id(&self) -> ArchiveResult<Option<u64>> {
        let max: Option<i64> = self
            .conn
            .query_row("SELECT MAX(doc_id) FROM documents", [], |row| row.get(0))?;
        Ok(max.map(|id| id as u64))
    }
}
