//! Quire main entry point
//!
//! This is the command-line interface for the Quire document harvester.

use anyhow::Context;
use clap::Parser;
use quire::config::{hash_config_text, load_config_with_hash, validate, Config};
use quire::crawler::{build_http_client, chunk_count, default_pool_size, discover_latest_id, run_crawl};
use quire::output::{load_statistics, print_statistics, write_documents};
use quire::SqliteArchive;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Quire: a checkpointed document harvester
///
/// Quire fetches documents addressed by consecutive integer ids, extracts
/// their text and counters, and commits them to a SQLite archive every few
/// chunks so an interrupted run loses at most the uncommitted tail.
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(version)]
#[command(about = "A checkpointed document harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Number of ids to harvest
    #[arg(long)]
    count: Option<u64>,

    /// First id to harvest
    #[arg(long)]
    start_id: Option<u64>,

    /// Ids per chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Commit the archive every N chunks
    #[arg(long)]
    commit_every: Option<usize>,

    /// Archive file path
    #[arg(long, value_name = "PATH")]
    archive: Option<String>,

    /// Harvest every id up to the newest one on the site
    #[arg(short, long, conflicts_with = "count")]
    all: bool,

    /// Print one harvested document per chunk
    #[arg(long)]
    verbose_records: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching
    #[arg(long, conflicts_with_all = ["stats", "read"])]
    dry_run: bool,

    /// Show archive statistics and exit
    #[arg(long, conflicts_with_all = ["dry_run", "read"])]
    stats: bool,

    /// Print every committed document and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    read: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (cfg, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        None => (Config::default(), hash_config_text("")),
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("invalid configuration")?;

    if cli.stats {
        handle_stats(&config)
    } else if cli.read {
        handle_read(&config)
    } else {
        if cli.all {
            let client = build_http_client(&config.fetch)?;
            let latest = discover_latest_id(&client, &config.fetch.latest_url).await?;
            config.crawler.count = latest;
            validate(&config).context("invalid id range after discovering latest id")?;
        }

        if cli.dry_run {
            handle_dry_run(&config);
            Ok(())
        } else {
            handle_crawl(config, &config_hash).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("quire=info,warn"),
            1 => EnvFilter::new("quire=debug,info"),
            2 => EnvFilter::new("quire=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command-line flags win over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(count) = cli.count {
        config.crawler.count = count;
    }
    if let Some(start_id) = cli.start_id {
        config.crawler.start_id = start_id;
    }
    if let Some(chunk_size) = cli.chunk_size {
        config.crawler.chunk_size = chunk_size;
    }
    if let Some(commit_every) = cli.commit_every {
        config.crawler.commit_every = commit_every;
    }
    if let Some(archive) = &cli.archive {
        config.output.archive_path = archive.clone();
    }
    if cli.verbose_records {
        config.crawler.verbose = true;
    }
}

/// Handles the --dry-run mode
fn handle_dry_run(config: &Config) {
    let crawler = &config.crawler;

    println!("=== Quire Dry Run ===\n");

    println!("Harvest:");
    println!(
        "  Ids: [{}, {}) ({} ids)",
        crawler.start_id,
        crawler.start_id.saturating_add(crawler.count),
        crawler.count
    );
    println!(
        "  Chunks: {} of {}",
        chunk_count(crawler.count, crawler.chunk_size),
        crawler.chunk_size.max(1)
    );
    println!("  Commit every: {} chunks", crawler.commit_every);
    println!(
        "  Workers: {} ({} per CPU)",
        default_pool_size(crawler.pool_multiplier),
        crawler.pool_multiplier
    );

    println!("\nFetch:");
    println!("  Base URL: {}", config.fetch.base_url);
    println!("  User agent: {}", config.fetch.user_agent);
    println!("  Timeout: {}s", config.fetch.timeout_secs);

    println!("\nOutput:");
    println!("  Archive: {}", config.output.archive_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Archive: {}\n", config.output.archive_path);

    let archive = SqliteArchive::new(Path::new(&config.output.archive_path))?;
    let stats = load_statistics(&archive)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --read mode
fn handle_read(config: &Config) -> anyhow::Result<()> {
    let archive = SqliteArchive::new(Path::new(&config.output.archive_path))?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let written = write_documents(&archive, &mut out)?;
    tracing::info!("Printed {} documents", written);
    Ok(())
}

/// Handles the main harvest operation
async fn handle_crawl(config: Config, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Harvesting {} ids from {} into {}",
        config.crawler.count,
        config.crawler.start_id,
        config.output.archive_path
    );

    match run_crawl(config, config_hash).await {
        Ok(report) => {
            if report.interrupted {
                tracing::warn!(
                    "Harvest interrupted after {} of {} chunks; {} records committed",
                    report.chunks_processed,
                    report.chunks_total,
                    report.records_written
                );
            } else {
                tracing::info!(
                    "Harvest completed: {} records, {} skipped ({} missing, {} unreadable, {} malformed, {} unexpected)",
                    report.records_written,
                    report.skipped.total(),
                    report.skipped.fetch,
                    report.skipped.extraction,
                    report.skipped.malformed,
                    report.skipped.unanticipated
                );
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
