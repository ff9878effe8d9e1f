//! Crawler coordinator - main crawl orchestration logic
//!
//! This module wires the pipeline stages together:
//! 1. Discovery: listing pages, filtered by the crawl window (sequential)
//! 2. Participants: one standings fetch per tournament (fan-out)
//! 3. Decklists and 4. match histories: one fetch per participant each,
//!    run concurrently with each other (fan-out)
//!
//! Every stream is upserted right after the stage that produced it.

use crate::config::{Config, SourceConfig};
use crate::crawler::extract::{extract_deck, extract_matches, extract_participants};
use crate::crawler::fanout::FanOutExecutor;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::paginator::Paginator;
use crate::crawler::parser::{HtmlRecordParser, RecordParser};
use crate::crawler::window::{CrawlMode, IncrementalWindowFilter};
use crate::output::CrawlReport;
use crate::records::{TournamentQuery, TournamentRecord};
use crate::storage::{RowCounts, SqliteStorage, Storage};
use crate::{ConfigError, HarvestError};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Result of the discovery stage
#[derive(Debug)]
struct Discovery {
    tournaments: Vec<TournamentRecord>,
    pages_fetched: u32,
    stopped_early: bool,
}

/// Builds the first-page listing query for a crawl
///
/// The time window is `time_override`, else the configured `time`, else
/// `all`. It is the same for both crawl modes: the window filter, not the
/// listing, decides which months a windowed crawl keeps.
pub fn resolve_listing_query(
    source: &SourceConfig,
    time_override: Option<&str>,
) -> TournamentQuery {
    let query = TournamentQuery::from_source(source);
    match time_override {
        Some(time) => query.with_time(time),
        None => query,
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<S: Storage> {
    config: Arc<Config>,
    config_hash: String,
    fetcher: Arc<dyn PageFetcher>,
    parser: Arc<dyn RecordParser>,
    storage: S,
    executor: FanOutExecutor,
    time_override: Option<String>,
}

impl Coordinator<SqliteStorage> {
    /// Creates a coordinator with the HTTP fetcher, HTML parser and SQLite
    /// store described by `config`
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    /// * `config_hash` - Hash of the configuration file, recorded per run
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Failed to build the client or open the database
    pub fn from_config(config: Config, config_hash: &str) -> Result<Self, HarvestError> {
        let base_url = Url::parse(&config.source.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("{}: {}", config.source.base_url, e))
        })?;

        let fetcher = HttpFetcher::from_config(&config.user_agent, &config.crawler)?;
        let parser = HtmlRecordParser::new(base_url);
        let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

        Ok(Self::new(
            config,
            config_hash,
            Arc::new(fetcher),
            Arc::new(parser),
            storage,
        ))
    }
}

impl<S: Storage> Coordinator<S> {
    pub fn new(
        config: Config,
        config_hash: &str,
        fetcher: Arc<dyn PageFetcher>,
        parser: Arc<dyn RecordParser>,
        storage: S,
    ) -> Self {
        let executor = FanOutExecutor::new(config.crawler.concurrency);
        Self {
            config: Arc::new(config),
            config_hash: config_hash.to_string(),
            fetcher,
            parser,
            storage,
            executor,
            time_override: None,
        }
    }

    /// Uses `time` as the listing time window instead of the configured one
    pub fn with_time_override(mut self, time: Option<String>) -> Self {
        self.time_override = time;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The first-page listing query
    pub fn listing_query(&self) -> TournamentQuery {
        resolve_listing_query(&self.config.source, self.time_override.as_deref())
    }

    /// Runs one complete crawl
    ///
    /// The run is recorded in storage: completed with its counts on success,
    /// failed with the error message otherwise. Per-item failures do not
    /// fail the run; they are returned in the report.
    pub async fn run(&mut self, mode: CrawlMode) -> Result<CrawlReport, HarvestError> {
        let run_id = self
            .storage
            .create_run(&self.config_hash, &mode.to_db_string())?;
        tracing::info!("Starting crawl run {} in {} mode", run_id, mode);

        let start_time = std::time::Instant::now();

        match self.execute(run_id, mode).await {
            Ok(report) => {
                self.storage
                    .complete_run(run_id, &report.counts, report.failures.len() as u64)?;
                tracing::info!(
                    "Crawl run {} completed in {:?}: {} tournaments, {} participants, {} decks, {} matches, {} failed items",
                    run_id,
                    start_time.elapsed(),
                    report.counts.tournaments,
                    report.counts.participants,
                    report.counts.decks,
                    report.counts.matches,
                    report.failures.len()
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!("Crawl run {} failed: {}", run_id, e);
                if let Err(storage_err) = self.storage.fail_run(run_id, &e.to_string()) {
                    tracing::error!("Could not mark run {} as failed: {}", run_id, storage_err);
                }
                Err(e)
            }
        }
    }

    async fn execute(&mut self, run_id: i64, mode: CrawlMode) -> Result<CrawlReport, HarvestError> {
        let discovery = self.discover(mode).await?;
        let mut counts = RowCounts::default();

        counts.tournaments = self.storage.upsert_tournaments(&discovery.tournaments)? as u64;

        let fetcher = self.fetcher.as_ref();
        let parser = self.parser.as_ref();

        // Stage 2
        let participants = self
            .executor
            .run(
                "participants",
                discovery.tournaments.iter().collect::<Vec<_>>(),
                move |tournament| extract_participants(fetcher, parser, tournament),
            )
            .await;
        let mut failures = participants.failures;
        let participants: Vec<_> = participants.results.into_iter().flatten().collect();

        counts.participants = self.storage.upsert_participants(&participants)? as u64;

        // Stages 3 and 4
        let (decks, matches) = tokio::join!(
            self.executor.run(
                "decklist",
                participants.iter().collect::<Vec<_>>(),
                move |participant| extract_deck(fetcher, parser, participant),
            ),
            self.executor.run(
                "matches",
                participants.iter().collect::<Vec<_>>(),
                move |participant| extract_matches(fetcher, parser, participant),
            ),
        );
        failures.extend(decks.failures);
        failures.extend(matches.failures);

        let decks: Vec<_> = decks.results.into_iter().flatten().collect();
        let matches: Vec<_> = matches.results.into_iter().flatten().collect();

        counts.decks = self.storage.upsert_decks(&decks)? as u64;
        counts.matches = self.storage.upsert_matches(&matches)? as u64;

        Ok(CrawlReport {
            run_id,
            mode,
            pages_fetched: discovery.pages_fetched,
            stopped_early: discovery.stopped_early,
            counts,
            failures,
        })
    }

    /// Stage 1: walks listing pages until a short page or the window stops
    ///
    /// Any page failure is fatal. A tournament listed on more than one page
    /// is kept once.
    async fn discover(&self, mode: CrawlMode) -> Result<Discovery, HarvestError> {
        let mut query = self.listing_query();
        let paginator = Paginator::new(
            self.fetcher.as_ref(),
            self.parser.as_ref(),
            &self.config.source.base_url,
        );
        let mut filter = IncrementalWindowFilter::new(mode);

        let mut tournaments = Vec::new();
        let mut seen = HashSet::new();
        let mut pages_fetched = 0;

        loop {
            let page = paginator
                .next_page(&query)
                .await
                .map_err(|source| HarvestError::Discovery {
                    page: query.page(),
                    source,
                })?;
            pages_fetched += 1;

            let listed = page.records.len();
            let kept = filter.filter_page(page.records);
            tracing::info!(
                "Listing page {}: kept {} of {} tournaments ({} rows)",
                query.page(),
                kept.len(),
                listed,
                page.rows
            );

            tournaments.extend(
                kept.into_iter()
                    .filter(|t| seen.insert(t.tournament_page.clone())),
            );

            if filter.is_stopped() || !page.more {
                break;
            }
            query.increment_page();
        }

        Ok(Discovery {
            tournaments,
            pages_fetched,
            stopped_early: filter.is_stopped(),
        })
    }
}
