use serde::Deserialize;

/// Main configuration structure for Quire
///
/// Every section is optional; missing keys take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
}

/// Id range and batching configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// First document id to harvest
    pub start_id: u64,

    /// Number of consecutive ids to harvest
    pub count: u64,

    /// Ids dispatched to the worker pool per chunk
    pub chunk_size: usize,

    /// Commit the archive after this many chunks
    pub commit_every: usize,

    /// Workers per available CPU
    pub pool_multiplier: usize,

    /// Print one record's text per completed chunk
    pub verbose: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_id: 1,
            count: 100_000,
            chunk_size: 1000,
            commit_every: 50,
            pool_multiplier: 6,
            verbose: false,
        }
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Base URL; a document's address is this plus its id
    pub base_url: String,

    /// Landing page used to discover the newest document id
    pub latest_url: String,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://allpoetry.com/poem/".to_string(),
            latest_url: "https://allpoetry.com/".to_string(),
            user_agent: format!("quire/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite archive file
    pub archive_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            archive_path: "out/archive.db".to_string(),
        }
    }
}
