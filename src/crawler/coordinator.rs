//! Crawl coordinator - main harvest orchestration logic
//!
//! This module drives a run end to end:
//! - Partitioning the requested id range into chunks
//! - Dispatching each chunk to the worker pool and waiting at the barrier
//! - Appending surviving records and committing every N chunks
//! - A final unconditional commit, however the loop ends
//!
//! The archive writer is only touched from this task, between chunks, so it
//! needs no locking.

use crate::archive::{ArchiveStore, CheckpointedArchiveWriter, RunParams, SqliteArchive};
use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::DocumentFetcher;
use crate::crawler::partition::{chunk_count, partition};
use crate::crawler::pool::{default_pool_size, ChunkResult, WorkerPool};
use crate::crawler::unit::{SkipReason, UnitOfWork};
use crate::state::{CrawlPhase, RunStatus};
use crate::QuireError;
use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The id range and batching knobs for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlPlan {
    pub start_id: u64,
    pub count: u64,
    pub chunk_size: usize,
    pub commit_every: usize,
    pub verbose: bool,
}

impl CrawlPlan {
    pub fn total_chunks(&self) -> usize {
        chunk_count(self.count, self.chunk_size)
    }

    pub fn run_params(&self, config_hash: &str) -> RunParams {
        RunParams {
            start_id: self.start_id,
            count: self.count,
            chunk_size: self.chunk_size.max(1),
            commit_every: self.commit_every.max(1),
            config_hash: config_hash.to_string(),
        }
    }
}

impl From<&CrawlerConfig> for CrawlPlan {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            start_id: config.start_id,
            count: config.count,
            chunk_size: config.chunk_size,
            commit_every: config.commit_every,
            verbose: config.verbose,
        }
    }
}

/// Tally of skipped ids by reason
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub fetch: u64,
    pub extraction: u64,
    pub malformed: u64,
    pub unanticipated: u64,
}

impl SkipCounts {
    pub fn record(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::Fetch { .. } => self.fetch += 1,
            SkipReason::Extraction(_) => self.extraction += 1,
            SkipReason::MalformedMetadata { .. } => self.malformed += 1,
            SkipReason::Unanticipated(_) => self.unanticipated += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.fetch + self.extraction + self.malformed + self.unanticipated
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub run_id: i64,
    pub chunks_total: usize,
    pub chunks_processed: usize,
    pub ids_attempted: u64,
    pub records_written: u64,
    pub skipped: SkipCounts,
    /// Commit calls, including the final one
    pub checkpoints: u64,
    /// Segments actually written to the archive
    pub segments: u64,
    pub interrupted: bool,
    pub elapsed: Duration,
}

/// Main harvest coordinator structure
pub struct Coordinator {
    plan: CrawlPlan,
    unit: Arc<UnitOfWork>,
    shutdown: Arc<AtomicBool>,
    phase: CrawlPhase,
}

impl Coordinator {
    /// Creates a coordinator for `plan` using `unit` for each id
    pub fn new(plan: CrawlPlan, unit: UnitOfWork) -> Self {
        Self {
            plan,
            unit: Arc::new(unit),
            shutdown: Arc::new(AtomicBool::new(false)),
            phase: CrawlPhase::Idle,
        }
    }

    /// Creates a coordinator from configuration, building the HTTP fetcher
    pub fn from_config(config: &Config) -> Result<Self, QuireError> {
        let fetcher = DocumentFetcher::from_config(&config.fetch)?;
        Ok(Self::new(
            CrawlPlan::from(&config.crawler),
            UnitOfWork::new(fetcher),
        ))
    }

    /// Flag that, once set, stops the run after the in-flight chunk
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn plan(&self) -> &CrawlPlan {
        &self.plan
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), QuireError> {
        if !self.phase.can_transition_to(next) {
            return Err(QuireError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Runs the harvest loop
    ///
    /// Only archive failures abort the run; every per-id failure is counted
    /// and skipped. Whether the loop completes or is interrupted, pending
    /// records get one last commit before the run is closed.
    pub async fn run<S: ArchiveStore>(
        &mut self,
        pool: &WorkerPool,
        writer: &mut CheckpointedArchiveWriter<S>,
    ) -> Result<CrawlReport, QuireError> {
        self.transition(CrawlPhase::Running)?;

        let started = Instant::now();
        let commit_every = self.plan.commit_every.max(1);
        let mut report = CrawlReport {
            run_id: writer.run_id(),
            chunks_total: self.plan.total_chunks(),
            ..CrawlReport::default()
        };

        tracing::info!(
            "Starting run {}: ids [{}, {}), {} chunks of {}, commit every {} chunks, {} workers",
            report.run_id,
            self.plan.start_id,
            self.plan.start_id.saturating_add(self.plan.count),
            report.chunks_total,
            self.plan.chunk_size.max(1),
            commit_every,
            pool.size()
        );

        let mut since_commit = 0usize;

        for chunk in partition(self.plan.start_id, self.plan.count, self.plan.chunk_size) {
            if self.shutdown.load(Ordering::SeqCst) {
                tracing::warn!(
                    "Shutdown requested; stopping before chunk {} (ids from {}), {} records pending",
                    chunk.index + 1,
                    chunk.start,
                    writer.pending_len()
                );
                report.interrupted = true;
                break;
            }

            self.transition(CrawlPhase::Fetching)?;
            let chunk_started = Instant::now();
            let result = pool.run_chunk(&chunk, &self.unit).await;

            self.transition(CrawlPhase::Writing)?;
            let kept = result.records.len();
            let skipped = result.skipped.len();
            self.absorb(result, writer, &mut report);
            report.ids_attempted += chunk.len() as u64;
            report.chunks_processed += 1;

            since_commit += 1;
            if since_commit == commit_every {
                self.commit(writer)?;
                since_commit = 0;
            }

            self.transition(CrawlPhase::Running)?;

            let elapsed = started.elapsed().as_secs_f64();
            let rate = if elapsed > 0.0 {
                report.ids_attempted as f64 / elapsed
            } else {
                0.0
            };
            tracing::info!(
                "Chunk {}/{} [{}, {}): {} kept, {} skipped in {:.2?} ({:.1} ids/sec)",
                chunk.index + 1,
                report.chunks_total,
                chunk.start,
                chunk.end,
                kept,
                skipped,
                chunk_started.elapsed(),
                rate
            );
        }

        let status = if report.interrupted {
            RunStatus::Interrupted
        } else {
            RunStatus::Completed
        };
        if let Err(e) = writer.finish(status) {
            tracing::error!("Final commit failed: {}", e);
            self.phase = CrawlPhase::Idle;
            return Err(e.into());
        }
        self.transition(CrawlPhase::Done)?;

        report.records_written = writer.records_committed();
        report.checkpoints = writer.checkpoints();
        report.segments = writer.segments_written();
        report.elapsed = started.elapsed();

        tracing::info!(
            "Run {} {}: {} records from {} ids ({} skipped) in {:.2?}",
            report.run_id,
            status.to_db_string(),
            report.records_written,
            report.ids_attempted,
            report.skipped.total(),
            report.elapsed
        );

        Ok(report)
    }

    fn absorb<S: ArchiveStore>(
        &self,
        result: ChunkResult,
        writer: &mut CheckpointedArchiveWriter<S>,
        report: &mut CrawlReport,
    ) {
        if self.plan.verbose {
            if let Some(sample) = result.records.first() {
                println!("{}", sample.text());
            }
        }

        for (_, reason) in &result.skipped {
            report.skipped.record(reason);
        }
        for record in result.records {
            writer.append(record);
        }
    }

    fn commit<S: ArchiveStore>(
        &mut self,
        writer: &mut CheckpointedArchiveWriter<S>,
    ) -> Result<(), QuireError> {
        if let Err(e) = writer.commit() {
            tracing::error!("Commit failed, aborting run {}: {}", writer.run_id(), e);
            writer.abandon();
            self.phase = CrawlPhase::Idle;
            return Err(e.into());
        }
        Ok(())
    }
}

/// Runs a complete harvest from configuration
///
/// Opens the archive, sizes the worker pool, installs a Ctrl-C handler that
/// requests a graceful stop, and runs the coordinator to completion.
///
/// # Example
///
/// ```no_run
/// use quire::config::Config;
/// use quire::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(Config::default(), "").await?;
/// println!("{} records", report.records_written);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, config_hash: &str) -> Result<CrawlReport, QuireError> {
    let mut coordinator = Coordinator::from_config(&config)?;

    let archive = SqliteArchive::new(Path::new(&config.output.archive_path))?;
    let mut writer =
        CheckpointedArchiveWriter::start(archive, &coordinator.plan().run_params(config_hash))?;

    let pool = WorkerPool::new(default_pool_size(config.crawler.pool_multiplier));

    let shutdown = coordinator.shutdown_handle();
    let signal_task = tokio::spawn(async move {
        if watch_interrupts(&shutdown, tokio::signal::ctrl_c).await {
            std::process::exit(130);
        }
    });

    let result = coordinator.run(&pool, &mut writer).await;

    signal_task.abort();
    pool.close();

    result
}

/// Turns interrupt signals into a graceful stop, then a forced one
///
/// The first signal sets `shutdown` so the run ends after the in-flight
/// chunk. Returns `true` if a second signal arrives before the caller stops
/// waiting; uncommitted records are then abandoned. Returns `false` if the
/// signal source fails.
async fn watch_interrupts<F, Fut>(shutdown: &AtomicBool, mut next_signal: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = next_signal().await {
        tracing::warn!("Interrupt handler unavailable: {}", e);
        return false;
    }
    tracing::warn!(
        "Interrupt received; finishing current chunk before stopping (interrupt again to abort)"
    );
    shutdown.store(true, Ordering::SeqCst);

    if next_signal().await.is_err() {
        return false;
    }
    tracing::error!("Second interrupt received; aborting without a final commit");
    true
}
