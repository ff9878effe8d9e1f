//! Record types produced by the harvest pipeline
//!
//! Four linked streams, each with its own primary key:
//! - `TournamentRecord`: `tournament_page`
//! - `ParticipantRecord`: `(tournament_page, name)`
//! - `DeckRecord`: `(tournament_page, player)`
//! - `MatchRecord`: `(tournament_page, round, player)`

mod query;

pub use query::TournamentQuery;

use std::fmt;
use std::str::FromStr;

/// Renders an item's primary key, used to identify it in log lines
pub trait ItemKey {
    fn item_key(&self) -> String;
}

impl<T: ItemKey + ?Sized> ItemKey for &T {
    fn item_key(&self) -> String {
        (**self).item_key()
    }
}

/// A tournament discovered on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentRecord {
    /// Absolute URL of the standings page (primary key)
    pub tournament_page: String,
    /// ISO-ish date string as published by the site
    pub date: Option<String>,
    pub name: Option<String>,
    pub organizer: Option<String>,
    pub format: Option<String>,
    pub players: Option<u32>,
    pub winner: Option<String>,
}

impl ItemKey for TournamentRecord {
    fn item_key(&self) -> String {
        self.tournament_page.clone()
    }
}

/// One row of a tournament's standings table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRecord {
    pub tournament_page: String,
    pub name: String,
    pub place: Option<u32>,
    pub points: Option<String>,
    /// Win-loss-tie string, e.g. `5 - 1 - 0`
    pub record: Option<String>,
    /// Archetype label of the deck played
    pub deck: Option<String>,
    pub decklist_link: Option<String>,
    pub matches_link: Option<String>,
}

impl ItemKey for ParticipantRecord {
    fn item_key(&self) -> String {
        format!("{}#{}", self.tournament_page, self.name)
    }
}

/// A single decklist line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardEntry {
    pub quantity: u32,
    pub name: String,
    /// Set code and number, e.g. `A1 96`
    pub code: Option<String>,
}

/// A participant's full decklist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckRecord {
    pub tournament_page: String,
    pub player: String,
    pub decklist_link: String,
    pub cards: Vec<CardEntry>,
}

impl ItemKey for DeckRecord {
    fn item_key(&self) -> String {
        format!("{}#{}", self.tournament_page, self.player)
    }
}

/// Outcome of a single round from the participant's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchResult {
    Win,
    Loss,
    Tie,
}

impl MatchResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win => "WIN",
            Self::Loss => "LOSS",
            Self::Tie => "TIE",
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WIN" | "W" => Ok(Self::Win),
            "LOSS" | "L" => Ok(Self::Loss),
            "TIE" | "T" | "DRAW" => Ok(Self::Tie),
            other => Err(format!("unknown match result '{}'", other)),
        }
    }
}

/// One round of a participant's match history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub tournament_page: String,
    pub round: String,
    pub player: String,
    pub opponent: Option<String>,
    pub result: MatchResult,
}

impl ItemKey for MatchRecord {
    fn item_key(&self) -> String {
        format!("{}#{}#{}", self.tournament_page, self.round, self.player)
    }
}
