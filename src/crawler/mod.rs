//! Crawler module for the harvest pipeline
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing into typed records
//! - Listing pagination and the incremental date window
//! - Bounded fan-out over detail pages
//! - Overall crawl coordination

mod coordinator;
mod extract;
mod fanout;
mod fetcher;
mod paginator;
mod parser;
#[cfg(test)]
mod testing;
mod window;

pub use coordinator::{resolve_listing_query, Coordinator};
pub use extract::{extract_deck, extract_matches, extract_participants};
pub use fanout::{FanOutExecutor, FanOutReport, DEFAULT_CONCURRENCY};
pub use fetcher::{build_http_client, HttpFetcher, PageFetcher};
pub use paginator::{ListingPage, Paginator, LISTING_PATH};
pub use parser::{parse_card, HtmlRecordParser, ListingRows, RecordParser};
pub use window::{
    parse_tournament_date, CrawlMode, IncrementalWindowFilter, TargetMonth, WindowState,
};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::HarvestError;

/// Runs a complete crawl against the configured site and database
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the SQLite store and build the HTTP client
/// 2. Walk the listing pages allowed by `mode`
/// 3. Fan out over standings, decklist and match-history pages
/// 4. Upsert all four streams and record the run
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `config_hash` - Hash of the configuration, stored with the run
/// * `mode` - Backfill or a single target month
/// * `time_override` - Listing time window to use instead of the configured one
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed, possibly with per-item failures
/// * `Err(HarvestError)` - Crawl failed
///
/// # Example
///
/// ```no_run
/// use tcg_harvest::config::Config;
/// use tcg_harvest::crawler::{crawl, CrawlMode};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = crawl(Config::default(), "", CrawlMode::Backfill, None).await?;
/// println!("{} tournaments", report.counts.tournaments);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    config: Config,
    config_hash: &str,
    mode: CrawlMode,
    time_override: Option<String>,
) -> Result<CrawlReport, HarvestError> {
    let mut coordinator =
        Coordinator::from_config(config, config_hash)?.with_time_override(time_override);
    coordinator.run(mode).await
}
