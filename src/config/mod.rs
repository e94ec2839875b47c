//! Configuration module for Quire
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use quire::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("quire.toml")).unwrap();
//! println!("Harvesting {} ids", config.crawler.count);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FetchConfig, OutputConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, hash_config_text, load_config, load_config_with_hash, parse_config,
};
pub use validation::validate;
