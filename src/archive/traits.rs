//! Archive storage trait and error types

use crate::archive::{RunParams, RunRecord, SegmentRecord, StoredDocument};
use crate::extract::Record;
use crate::state::RunStatus;
use thiserror::Error;

/// Errors that can occur during archive operations
///
/// Any of these during a commit is fatal for the run.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Invalid archive data: {0}")]
    InvalidData(String),
}

/// Result type for archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Durable, append-only storage for harvested records
///
/// Records only become visible through [`ArchiveStore::commit_segment`],
/// which must be atomic: either every record of the segment is durable when
/// it returns `Ok`, or none is.
pub trait ArchiveStore {
    // ===== Run Management =====

    /// Records the start of a run and returns its id
    fn create_run(&mut self, params: &RunParams) -> ArchiveResult<i64>;

    /// Stamps a run with its final status and finish time
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> ArchiveResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> ArchiveResult<RunRecord>;

    /// Lists every run, oldest first
    fn list_runs(&self) -> ArchiveResult<Vec<RunRecord>>;

    // ===== Segments =====

    /// Durably writes `records` as one new segment of `run_id`
    ///
    /// Returns the new segment id.
    fn commit_segment(&mut self, run_id: i64, records: &[Record]) -> ArchiveResult<i64>;

    /// Lists every segment in commit order
    fn list_segments(&self) -> ArchiveResult<Vec<SegmentRecord>>;

    /// Reads the documents stored in one segment, in insertion order
    fn read_segment(&self, segment_id: i64) -> ArchiveResult<Vec<StoredDocument>>;

    // ===== Statistics =====

    /// Counts stored documents across all segments
    fn count_documents(&self) -> ArchiveResult<u64>;

    /// Highest document id ever committed, if any
    fn highest_committed_id(&self) -> ArchiveResult<Option<u64>>;
}
