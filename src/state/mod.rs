//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: where the orchestrator is within a run
//! - `RunStatus`: how a run ended, as persisted in the archive

mod crawl_phase;
mod run_status;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use run_status::RunStatus;
