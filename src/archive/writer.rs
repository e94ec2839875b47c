//! Checkpointed writer on top of an [`ArchiveStore`]
//!
//! Records accumulate in memory until [`CheckpointedArchiveWriter::commit`]
//! flushes them as one segment. Pending records are lost if the process dies
//! before the next commit; re-running the same id range re-derives them.

use crate::archive::traits::{ArchiveResult, ArchiveStore};
use crate::archive::RunParams;
use crate::extract::Record;
use crate::state::RunStatus;

/// Accumulates records and commits them to an archive in segments
pub struct CheckpointedArchiveWriter<S: ArchiveStore> {
    store: S,
    run_id: i64,
    pending: Vec<Record>,
    checkpoints: u64,
    segments_written: u64,
    records_committed: u64,
    finished: bool,
}

impl<S: ArchiveStore> CheckpointedArchiveWriter<S> {
    /// Registers a new run in `store` and returns a writer for it
    pub fn start(mut store: S, params: &RunParams) -> ArchiveResult<Self> {
        let run_id = store.create_run(params)?;
        tracing::debug!("Archive run {} opened", run_id);

        Ok(Self {
            store,
            run_id,
            pending: Vec::new(),
            checkpoints: 0,
            segments_written: 0,
            records_committed: 0,
            finished: false,
        })
    }

    /// Adds a record to the pending set
    pub fn append(&mut self, record: Record) {
        self.pending.push(record);
    }

    /// Durably flushes every pending record
    ///
    /// Returns the new segment id, or `None` when nothing was pending. An
    /// empty commit still counts as a checkpoint.
    pub fn commit(&mut self) -> ArchiveResult<Option<i64>> {
        self.checkpoints += 1;

        if self.pending.is_empty() {
            tracing::debug!("Checkpoint {} had nothing pending", self.checkpoints);
            return Ok(None);
        }

        let segment_id = self.store.commit_segment(self.run_id, &self.pending)?;
        let flushed = self.pending.len() as u64;
        self.pending.clear();
        self.segments_written += 1;
        self.records_committed += flushed;

        tracing::info!(
            "Committed segment {} ({} records, {} total)",
            segment_id,
            flushed,
            self.records_committed
        );

        Ok(Some(segment_id))
    }

    /// Performs the final commit and stamps the run with `status`
    ///
    /// If the final commit fails the run is marked failed (best effort) and
    /// the commit error is returned.
    pub fn finish(&mut self, status: RunStatus) -> ArchiveResult<()> {
        if let Err(e) = self.commit() {
            self.abandon();
            return Err(e);
        }
        self.store.finish_run(self.run_id, status)?;
        self.finished = true;
        Ok(())
    }

    /// Marks the run failed without flushing pending records
    pub fn abandon(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.store.finish_run(self.run_id, RunStatus::Failed) {
            tracing::error!("Could not mark run {} as failed: {}", self.run_id, e);
        }
        self.finished = true;
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Records appended but not yet committed
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of commit calls, including empty ones
    pub fn checkpoints(&self) -> u64 {
        self.checkpoints
    }

    /// Number of segments actually written
    pub fn segments_written(&self) -> u64 {
        self.segments_written
    }

    pub fn records_committed(&self) -> u64 {
        self.records_committed
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the writer and returns the underlying store
    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveError, SqliteArchive};

    fn params() -> RunParams {
        RunParams {
            start_id: 1,
            count: 100,
            chunk_size: 10,
            commit_every: 1,
            config_hash: "hash".to_string(),
        }
    }

    fn record(id: u64) -> Record {
        Record::new(id, id as f64, 1.0, 0.0, format!("poem {}", id))
    }

    #[test]
    fn test_append_then_commit_keeps_everything() {
        let store = SqliteArchive::new_in_memory().unwrap();
        let mut writer = CheckpointedArchiveWriter::start(store, &params()).unwrap();

        for id in 1..=5 {
            writer.append(record(id));
        }
        assert_eq!(writer.pending_len(), 5);

        let segment = writer.commit().unwrap().expect("segment should be written");
        assert_eq!(writer.pending_len(), 0);
        assert_eq!(writer.records_committed(), 5);

        let documents = writer.store().read_segment(segment).unwrap();
        assert_eq!(documents.len(), 5);
        for (expected_id, doc) in (1..=5).zip(&documents) {
            assert_eq!(doc.meta.id, expected_id);
            assert_eq!(doc.meta.views, expected_id as f64);
            assert_eq!(doc.text, format!("poem {}", expected_id));
        }
    }

    #[test]
    fn test_uncommitted_records_not_visible() {
        let store = SqliteArchive::new_in_memory().unwrap();
        let mut writer = CheckpointedArchiveWriter::start(store, &params()).unwrap();

        writer.append(record(1));
        writer.commit().unwrap();
        writer.append(record(2));

        assert_eq!(writer.store().count_documents().unwrap(), 1);
    }

    #[test]
    fn test_empty_commit_is_checkpoint_without_segment() {
        let store = SqliteArchive::new_in_memory().unwrap();
        let mut writer = CheckpointedArchiveWriter::start(store, &params()).unwrap();

        assert_eq!(writer.commit().unwrap(), None);
        assert_eq!(writer.checkpoints(), 1);
        assert_eq!(writer.segments_written(), 0);
        assert!(writer.store().list_segments().unwrap().is_empty());
    }

    #[test]
    fn test_finish_flushes_tail_and_completes_run() {
        let store = SqliteArchive::new_in_memory().unwrap();
        let mut writer = CheckpointedArchiveWriter::start(store, &params()).unwrap();

        writer.append(record(9));
        writer.finish(RunStatus::Completed).unwrap();

        let run_id = writer.run_id();
        let store = writer.into_store();
        assert_eq!(store.count_documents().unwrap(), 1);
        assert_eq!(store.get_run(run_id).unwrap().status, RunStatus::Completed);
    }

    #[test]
    fn test_abandon_marks_failed() {
        let store = SqliteArchive::new_in_memory().unwrap();
        let mut writer = CheckpointedArchiveWriter::start(store, &params()).unwrap();
        writer.append(record(1));
        writer.abandon();

        let run_id = writer.run_id();
        let store = writer.into_store();
        assert_eq!(store.get_run(run_id).unwrap().status, RunStatus::Failed);
        assert_eq!(store.count_documents().unwrap(), 0);
    }

    /// Store whose commits always fail, for exercising the fatal path
    struct BrokenStore;

    impl ArchiveStore for BrokenStore {
        fn create_run(&mut self, _params: &RunParams) -> ArchiveResult<i64> {
            Ok(1)
        }
        fn finish_run(&mut self, _run_id: i64, _status: RunStatus) -> ArchiveResult<()> {
            Ok(())
        }
        fn get_run(&self, run_id: i64) -> ArchiveResult<crate::archive::RunRecord> {
            Err(ArchiveError::RunNotFound(run_id))
        }
        fn list_runs(&self) -> ArchiveResult<Vec<crate::archive::RunRecord>> {
            Ok(Vec::new())
        }
        fn commit_segment(&mut self, _run_id: i64, _records: &[Record]) -> ArchiveResult<i64> {
            Err(ArchiveError::InvalidData("disk gone".to_string()))
        }
        fn list_segments(&self) -> ArchiveResult<Vec<crate::archive::SegmentRecord>> {
            Ok(Vec::new())
        }
        fn read_segment(&self, _segment_id: i64) -> ArchiveResult<Vec<crate::archive::StoredDocument>> {
            Ok(Vec::new())
        }
        fn count_documents(&self) -> ArchiveResult<u64> {
            Ok(0)
        }
        fn highest_committed_id(&self) -> ArchiveResult<Option<u64>> {
            Ok(None)
        }
    }

    #[test]
    fn test_commit_failure_propagates() {
        let mut writer = CheckpointedArchiveWriter::start(BrokenStore, &params()).unwrap();
        writer.append(record(1));

        assert!(writer.commit().is_err());
        assert_eq!(writer.pending_len(), 1);
        assert!(writer.finish(RunStatus::Completed).is_err());
    }
}
