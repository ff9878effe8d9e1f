//! tcg-harvest: incremental tournament results harvester
//!
//! This crate crawls a paginated tournament results site and assembles four
//! linked record streams (tournaments, participants, decklists and match
//! histories) into a SQLite store with upsert-by-key semantics.

pub mod config;
pub mod crawler;
pub mod output;
pub mod records;
pub mod storage;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A listing page could not be fetched or parsed. Fatal to the crawl.
    #[error("Discovery failed on listing page {page}: {source}")]
    Discovery { page: u32, source: ExtractError },

    /// A single fan-out item failed. Reported, never propagated out of a stage.
    #[error("{stage} extraction failed for {key}: {source}")]
    ItemExtraction {
        stage: &'static str,
        key: String,
        source: ExtractError,
    },

    #[error("Invalid target month '{0}', expected YYYY-MM")]
    InvalidMonth(String),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
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

/// Errors raised while fetching a single page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),
}

/// Errors raised while turning a page body into records
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Missing element '{0}'")]
    MissingElement(&'static str),

    #[error("Unexpected table headers: {0:?}")]
    UnexpectedHeaders(Vec<String>),

    #[error("Invalid card line '{0}'")]
    InvalidCard(String),
}

/// Error returned by every per-page unit of work (fetch then parse)
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A tournament date that could not be read as a calendar date
#[derive(Debug, Error)]
#[error("Unparseable tournament date '{0}'")]
pub struct DateParseError(pub String);

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlMode, TargetMonth};
pub use records::{
    CardEntry, DeckRecord, MatchRecord, MatchResult, ParticipantRecord, TournamentQuery,
    TournamentRecord,
};
