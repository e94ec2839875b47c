//! Crawler module for harvesting documents by id
//!
//! This module contains the core harvesting pipeline:
//! - HTTP fetching of one document per id
//! - The per-id unit of work with tagged skip reasons
//! - Range partitioning and the bounded worker pool
//! - Overall run coordination and checkpointing

mod coordinator;
mod fetcher;
mod latest;
mod partition;
mod pool;
mod unit;

pub use coordinator::{run_crawl, Coordinator, CrawlPlan, CrawlReport, SkipCounts};
pub use fetcher::{build_http_client, DocumentFetcher, FetchError};
pub use latest::{discover_latest_id, parse_latest_id};
pub use partition::{chunk_count, partition, Chunk, Partition};
pub use pool::{default_pool_size, ChunkResult, WorkerPool};
pub use unit::{Outcome, SkipReason, UnitOfWork};
