//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the harvest database.
//! Every stream table carries its record's primary key so writes can merge
//! with `ON CONFLICT ... DO UPDATE`.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    mode TEXT NOT NULL,
    status TEXT NOT NULL,
    tournaments INTEGER NOT NULL DEFAULT 0,
    participants INTEGER NOT NULL DEFAULT 0,
    decks INTEGER NOT NULL DEFAULT 0,
    matches INTEGER NOT NULL DEFAULT 0,
    item_failures INTEGER NOT NULL DEFAULT 0,
    error_message TEXT
);

CREATE TABLE IF NOT EXISTS tournaments (
    tournament_page TEXT PRIMARY KEY,
    date TEXT,
    name TEXT,
    organizer TEXT,
    format TEXT,
    players INTEGER,
    winner TEXT,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tournaments_date ON tournaments(date);

CREATE TABLE IF NOT EXISTS tournament_participants (
    tournament_page TEXT NOT NULL,
    name TEXT NOT NULL,
    place INTEGER,
    points TEXT,
    record TEXT,
    deck TEXT,
    decklist_link TEXT,
    matches_link TEXT,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (tournament_page, name)
);

CREATE INDEX IF NOT EXISTS idx_participants_deck ON tournament_participants(deck);

CREATE TABLE IF NOT EXISTS participant_deck (
    tournament_page TEXT NOT NULL,
    player TEXT NOT NULL,
    decklist_link TEXT NOT NULL,
    card_count INTEGER NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (tournament_page, player)
);

-- Card lines of a deck, replaced wholesale whenever the deck is upserted
CREATE TABLE IF NOT EXISTS participant_deck_cards (
    tournament_page TEXT NOT NULL,
    player TEXT NOT NULL,
    position INTEGER NOT NULL,
    quantity INTEGER NOT NULL,
    name TEXT NOT NULL,
    code TEXT,
    PRIMARY KEY (tournament_page, player, position)
);

CREATE INDEX IF NOT EXISTS idx_deck_cards_name ON participant_deck_cards(name);

CREATE TABLE IF NOT EXISTS participant_matches (
    tournament_page TEXT NOT NULL,
    round TEXT NOT NULL,
    player TEXT NOT NULL,
    opponent TEXT,
    result TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (tournament_page, round, player)
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
