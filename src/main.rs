//! tcg-harvest main entry point
//!
//! This is the command-line interface for the tournament results harvester.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tcg_harvest::config::{default_config_with_hash, load_config_with_hash, validate, Config};
use tcg_harvest::crawler::{crawl, resolve_listing_query, CrawlMode};
use tcg_harvest::output::{load_statistics, print_report, print_statistics};
use tcg_harvest::storage::SqliteStorage;
use tracing_subscriber::EnvFilter;

/// tcg-harvest: incremental tournament results harvester
///
/// Crawls the completed-tournaments listing of a results site and stores
/// tournaments, standings, decklists and match histories in SQLite. By
/// default only tournaments of the current month are harvested.
#[derive(Parser, Debug)]
#[command(name = "tcg-harvest")]
#[command(version)]
#[command(about = "Incremental tournament results harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Harvest every listed tournament regardless of date
    #[arg(long, conflicts_with = "month")]
    backfill: bool,

    /// Harvest only tournaments of this month (YYYY-MM, default: current month)
    #[arg(long, value_name = "YYYY-MM")]
    month: Option<String>,

    /// Listing time window to request (e.g. 7days, 4weeks, all)
    #[arg(long)]
    time: Option<String>,

    /// Fan-out width for detail page fetches
    #[arg(long)]
    concurrency: Option<usize>,

    /// Validate config and show what would be crawled without fetching
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            default_config_with_hash()?
        }
    };
    tracing::debug!("Configuration hash: {}", config_hash);

    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
        validate(&config).context("Invalid --concurrency")?;
    }

    let mode = CrawlMode::resolve(cli.backfill, cli.month.as_deref())?;

    if cli.dry_run {
        handle_dry_run(&config, mode, cli.time.as_deref())?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, &config_hash, mode, cli.time).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tcg_harvest=info,warn"),
            1 => EnvFilter::new("tcg_harvest=debug,info"),
            2 => EnvFilter::new("tcg_harvest=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, mode: CrawlMode, time: Option<&str>) -> anyhow::Result<()> {
    println!("=== tcg-harvest Dry Run ===\n");

    println!("Mode: {}", mode);

    println!("\nCrawler Configuration:");
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Connect timeout: {}s", config.crawler.connect_timeout_secs);
    println!(
        "  Retries: {} (backoff {}ms)",
        config.crawler.max_retries, config.crawler.retry_backoff_ms
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nSource: {}", config.source.base_url);

    let query = resolve_listing_query(&config.source, time);
    println!("Listing query (first page):");
    for (key, value) in query.to_params() {
        println!("  {}: {}", key, value);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    config_hash: &str,
    mode: CrawlMode,
    time: Option<String>,
) -> anyhow::Result<()> {
    tracing::info!(
        "Harvesting {} {} tournaments from {} ({} mode)",
        config.source.game,
        config.source.format,
        config.source.base_url,
        mode
    );

    match crawl(config, config_hash, mode, time).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
