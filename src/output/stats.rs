//! Statistics generation from the document archive
//!
//! This module provides functionality for extracting and displaying
//! archive statistics.

use crate::archive::{ArchiveStore, RunRecord};
use crate::QuireError;

/// Archive statistics summary
#[derive(Debug, Clone)]
pub struct ArchiveStatistics {
    /// Every run recorded in the archive, oldest first
    pub runs: Vec<RunRecord>,

    /// Number of committed segments
    pub segments: u64,

    /// Number of stored documents
    pub documents: u64,

    /// Highest committed document id, if any
    pub highest_committed_id: Option<u64>,
}

impl ArchiveStatistics {
    /// Suggested start id for the next run: one past the highest committed id
    pub fn next_start_id(&self) -> u64 {
        self.highest_committed_id.map(|id| id + 1).unwrap_or(1)
    }
}

/// Loads statistics from an archive
pub fn load_statistics(store: &dyn ArchiveStore) -> Result<ArchiveStatistics, QuireError> {
    let runs = store.list_runs()?;
    let segments = store.list_segments()?.len() as u64;
    let documents = store.count_documents()?;
    let highest_committed_id = store.highest_committed_id()?;

    Ok(ArchiveStatistics {
        runs,
        segments,
        documents,
        highest_committed_id,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &ArchiveStatistics) {
    println!("=== Archive Statistics ===\n");

    println!("Overview:");
    println!("  Runs: {}", stats.runs.len());
    println!("  Segments: {}", stats.segments);
    println!("  Documents: {}", stats.documents);
    match stats.highest_committed_id {
        Some(id) => println!("  Highest committed id: {} (next start: {})", id, id + 1),
        None => println!("  Highest committed id: none"),
    }
    println!();

    if !stats.runs.is_empty() {
        println!("Runs:");
        for run in &stats.runs {
            println!(
                "  #{} {} ids [{}, {}) chunk {} commit every {} started {}{}",
                run.id,
                run.status.to_db_string(),
                run.start_id,
                run.start_id.saturating_add(run.count),
                run.chunk_size,
                run.commit_every,
                run.started_at,
                run.finished_at
                    .as_deref()
                    .map(|at| format!(" finished {}", at))
                    .unwrap_or_default()
            );
        }
    }
}
