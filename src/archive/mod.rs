//! Archive module for persisting harvested documents
//!
//! This module handles:
//! - SQLite archive initialization and schema management
//! - Checkpointed, segment-per-commit writing of records
//! - Run bookkeeping for provenance
//! - Reading committed documents back, grouped by segment

mod schema;
mod sqlite;
mod traits;
mod writer;

pub use sqlite::SqliteArchive;
pub use traits::{ArchiveError, ArchiveResult, ArchiveStore};
pub use writer::CheckpointedArchiveWriter;

use crate::state::RunStatus;

/// Parameters describing a run, recorded when it starts
#[derive(Debug, Clone)]
pub struct RunParams {
    pub start_id: u64,
    pub count: u64,
    pub chunk_size: usize,
    pub commit_every: usize,
    pub config_hash: String,
}

/// Represents a harvest run in the archive
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub start_id: u64,
    pub count: u64,
    pub chunk_size: usize,
    pub commit_every: usize,
    pub status: RunStatus,
}

/// One committed segment
#[derive(Debug, Clone)]
pub struct SegmentRecord {
    pub id: i64,
    pub run_id: i64,
    pub committed_at: String,
    pub record_count: u64,
}

/// Metadata sidecar stored next to each document's text
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMeta {
    pub id: u64,
    pub views: f64,
    pub comments: f64,
    pub likes: f64,
}

/// A committed document as read back from the archive
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub text: String,
    pub meta: DocumentMeta,
}

impl StoredDocument {
    /// Splits into the `(text, metadata)` pair
    pub fn into_parts(self) -> (String, DocumentMeta) {
        (self.text, self.meta)
    }
}

/// Read-only view over an archive, grouped by segment
pub struct ArchiveReader<'a> {
    store: &'a dyn ArchiveStore,
}

impl<'a> ArchiveReader<'a> {
    pub fn new(store: &'a dyn ArchiveStore) -> Self {
        Self { store }
    }

    /// Segments in commit order
    pub fn segments(&self) -> ArchiveResult<Vec<SegmentRecord>> {
        self.store.list_segments()
    }

    /// `(text, metadata)` pairs for one segment
    pub fn documents(&self, segment: &SegmentRecord) -> ArchiveResult<Vec<(String, DocumentMeta)>> {
        Ok(self
            .store
            .read_segment(segment.id)?
            .into_iter()
            .map(StoredDocument::into_parts)
            .collect())
    }

    /// Visits every committed document, segment by segment
    pub fn for_each<F>(&self, mut visit: F) -> ArchiveResult<()>
    where
        F: FnMut(&SegmentRecord, &str, &DocumentMeta),
    {
        for segment in self.segments()? {
            for (text, meta) in self.documents(&segment)? {
                visit(&segment, &text, &meta);
            }
        }
        Ok(())
    }
}
