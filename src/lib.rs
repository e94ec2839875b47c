//! Quire: a checkpointed harvester for numbered documents
//!
//! This crate walks a contiguous range of integer document ids, fetches each
//! document concurrently, extracts its text and counters, and commits the
//! results into an append-only SQLite archive every few chunks.

pub mod archive;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Quire operations
///
/// Per-document failures never reach this type: they are folded into
/// [`crawler::Outcome::Skip`]. Anything surfacing here aborts the run.
#[derive(Debug, Error)]
pub enum QuireError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Archive error: {0}")]
    Archive(#[from] archive::ArchiveError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Could not discover the latest document id from {url}: {message}")]
    LatestId { url: String, message: String },

    #[error("Invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Quire operations
pub type Result<T> = std::result::Result<T, QuireError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use archive::{ArchiveReader, CheckpointedArchiveWriter, SqliteArchive};
pub use config::Config;
pub use crawler::{Coordinator, Outcome, SkipReason, UnitOfWork, WorkerPool};
pub use extract::{Record, Region};
pub use state::{CrawlPhase, RunStatus};
