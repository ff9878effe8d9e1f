//! Storage module for persisting harvested records
//!
//! This module handles all database operations for the harvester, including:
//! - SQLite database initialization and schema management
//! - Upsert-by-key writes for the four record streams
//! - Crawl run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

/// The four output streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Tournaments,
    Participants,
    Decks,
    Matches,
}

impl Table {
    pub const ALL: [Table; 4] = [
        Table::Tournaments,
        Table::Participants,
        Table::Decks,
        Table::Matches,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Tournaments => "tournaments",
            Self::Participants => "tournament_participants",
            Self::Decks => "participant_deck",
            Self::Matches => "participant_matches",
        }
    }
}

/// Row or record counts per stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub tournaments: u64,
    pub participants: u64,
    pub decks: u64,
    pub matches: u64,
}

impl RowCounts {
    pub fn get(&self, table: Table) -> u64 {
        match table {
            Table::Tournaments => self.tournaments,
            Table::Participants => self.participants,
            Table::Decks => self.decks,
            Table::Matches => self.matches,
        }
    }
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub mode: String,
    pub status: RunStatus,
    /// Records written by the run
    pub counts: RowCounts,
    pub item_failures: u64,
    pub error_message: Option<String>,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
