//! Bounded worker pool for running a chunk's units of work
//!
//! The pool is an explicit handle created once per run and passed to the
//! coordinator. Concurrency is capped by a semaphore sized to a multiple of
//! the machine's parallelism, since the work is mostly waiting on the network.
//! `run_chunk` returns only when every id in the chunk has resolved.

use crate::crawler::partition::Chunk;
use crate::crawler::unit::{Outcome, SkipReason, UnitOfWork};
use crate::extract::Record;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Records and skips produced by one chunk
#[derive(Debug, Default)]
pub struct ChunkResult {
    /// Successful records, ordered by id
    pub records: Vec<Record>,

    /// Ids that produced no record, with the reason
    pub skipped: Vec<(u64, SkipReason)>,
}

/// Default pool size: `multiplier` workers per available CPU
pub fn default_pool_size(multiplier: usize) -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    cpus.saturating_mul(multiplier.max(1))
}

/// Fixed-size pool of concurrent workers
#[derive(Debug)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Creates a pool running at most `size` units at once (minimum 1)
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Runs `unit` over every id in `chunk` and waits for all of them
    pub async fn run_chunk(&self, chunk: &Chunk, unit: &Arc<UnitOfWork>) -> ChunkResult {
        self.run_chunk_with(chunk, |id| {
            let unit = Arc::clone(unit);
            async move { unit.process(id).await }
        })
        .await
    }

    /// Runs `work` for every id in `chunk` under the pool's concurrency cap
    ///
    /// A panicking task resolves as `Skip(Unanticipated)` for its id.
    pub async fn run_chunk_with<F, Fut>(&self, chunk: &Chunk, mut work: F) -> ChunkResult
    where
        F: FnMut(u64) -> Fut,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let mut tasks = JoinSet::new();

        for id in chunk.ids() {
            let permits = Arc::clone(&self.permits);
            let task = work(id);

            tasks.spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (
                            id,
                            Outcome::Skip(SkipReason::Unanticipated(
                                "worker pool closed".to_string(),
                            )),
                        )
                    }
                };

                // Nested task keeps a panic tied to its id.
                match tokio::spawn(task).await {
                    Ok(outcome) => (id, outcome),
                    Err(join_error) => {
                        tracing::error!("Worker for document {} failed: {:?}", id, join_error);
                        (
                            id,
                            Outcome::Skip(SkipReason::Unanticipated(join_error.to_string())),
                        )
                    }
                }
            });
        }

        let mut result = ChunkResult::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Outcome::Success(record))) => result.records.push(record),
                Ok((id, Outcome::Skip(reason))) => result.skipped.push((id, reason)),
                Err(join_error) => {
                    tracing::error!("Worker task lost: {:?}", join_error);
                }
            }
        }

        result.records.sort_by_key(Record::id);
        result.skipped.sort_by_key(|(id, _)| *id);
        result
    }

    /// Stops handing out permits; later units resolve as skipped
    pub fn close(&self) {
        self.permits.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_size_minimum() {
        assert_eq!(WorkerPool::new(0).size(), 1);
        assert_eq!(WorkerPool::new(8).size(), 8);
    }

    #[test]
    fn test_default_pool_size_scales() {
        let one = default_pool_size(1);
        assert!(one >= 1);
        assert_eq!(default_pool_size(6), one * 6);
        assert_eq!(default_pool_size(0), one);
    }

    fn chunk(start: u64, end: u64) -> Chunk {
        Chunk {
            index: 0,
            start,
            end,
        }
    }

    #[tokio::test]
    async fn test_panicking_task_becomes_unanticipated_skip() {
        let pool = WorkerPool::new(2);
        let result = pool
            .run_chunk_with(&chunk(1, 4), |id| async move {
                if id == 2 {
                    panic!("extractor blew up on {}", id);
                }
                Outcome::Success(Record::new(id, 1.0, 0.0, 0.0, "text"))
            })
            .await;

        let ids: Vec<u64> = result.records.iter().map(Record::id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].0, 2);
        assert!(matches!(result.skipped[0].1, SkipReason::Unanticipated(_)));
    }

    #[tokio::test]
    async fn test_closed_pool_skips_every_id() {
        let pool = WorkerPool::new(1);
        pool.close();
        let result = pool
            .run_chunk_with(&chunk(10, 13), |id| async move {
                Outcome::Success(Record::new(id, 0.0, 0.0, 0.0, ""))
            })
            .await;

        assert!(result.records.is_empty());
        let ids: Vec<u64> = result.skipped.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }

    // Chunk execution against a live server is covered in tests/crawl_tests.rs
}
