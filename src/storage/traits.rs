//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::records::{DeckRecord, MatchRecord, ParticipantRecord, TournamentRecord};
use crate::storage::{RowCounts, RunRecord, Table};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every `upsert_*` method merges on the stream's primary key: writing the
/// same record twice leaves one row holding the latest values. Each call is
/// atomic; it returns the number of distinct keys written, so records
/// repeated within one batch count once.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run and returns its ID
    fn create_run(&mut self, config_hash: &str, mode: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Marks a run as completed with its written counts
    fn complete_run(
        &mut self,
        run_id: i64,
        counts: &RowCounts,
        item_failures: u64,
    ) -> StorageResult<()>;

    /// Marks a run as failed
    fn fail_run(&mut self, run_id: i64, error: &str) -> StorageResult<()>;

    // ===== Record Streams =====

    /// Upserts on `tournament_page`
    fn upsert_tournaments(&mut self, tournaments: &[TournamentRecord]) -> StorageResult<usize>;

    /// Upserts on `(tournament_page, name)`
    fn upsert_participants(&mut self, participants: &[ParticipantRecord])
        -> StorageResult<usize>;

    /// Upserts on `(tournament_page, player)`, replacing the card list
    fn upsert_decks(&mut self, decks: &[DeckRecord]) -> StorageResult<usize>;

    /// Upserts on `(tournament_page, round, player)`
    fn upsert_matches(&mut self, matches: &[MatchRecord]) -> StorageResult<usize>;

    /// Gets a stored deck with its cards in decklist order
    fn get_deck(&self, tournament_page: &str, player: &str) -> StorageResult<Option<DeckRecord>>;

    // ===== Statistics =====

    /// Counts the rows of one stream
    fn count_rows(&self, table: Table) -> StorageResult<u64>;

    /// Counts the rows of every stream
    fn row_counts(&self) -> StorageResult<RowCounts> {
        Ok(RowCounts {
            tournaments: self.count_rows(Table::Tournaments)?,
            participants: self.count_rows(Table::Participants)?,
            decks: self.count_rows(Table::Decks)?,
            matches: self.count_rows(Table::Matches)?,
        })
    }
}
