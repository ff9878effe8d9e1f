//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::records::{CardEntry, DeckRecord, MatchRecord, ParticipantRecord, TournamentRecord};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RowCounts, RunRecord, RunStatus, Table};
use crate::HarvestError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, mode, status,
     tournaments, participants, decks, matches, item_failures, error_message";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database file and initializes the schema
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn row_to_run(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        mode: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?).unwrap_or(RunStatus::Failed),
        counts: RowCounts {
            tournaments: row.get::<_, i64>(6)? as u64,
            participants: row.get::<_, i64>(7)? as u64,
            decks: row.get::<_, i64>(8)? as u64,
            matches: row.get::<_, i64>(9)? as u64,
        },
        item_failures: row.get::<_, i64>(10)? as u64,
        error_message: row.get(11)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str, mode: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, mode, status) VALUES (?1, ?2, ?3, ?4)",
            params![now, config_hash, mode, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                row_to_run,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                row_to_run,
            )
            .optional()?;
        Ok(run)
    }

    fn complete_run(
        &mut self,
        run_id: i64,
        counts: &RowCounts,
        item_failures: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, tournaments = ?3, participants = ?4,
             decks = ?5, matches = ?6, item_failures = ?7 WHERE id = ?8",
            params![
                RunStatus::Completed.to_db_string(),
                now,
                counts.tournaments as i64,
                counts.participants as i64,
                counts.decks as i64,
                counts.matches as i64,
                item_failures as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn fail_run(&mut self, run_id: i64, error: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, error_message = ?3 WHERE id = ?4",
            params![RunStatus::Failed.to_db_string(), now, error, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Record Streams =====

    fn upsert_tournaments(&mut self, tournaments: &[TournamentRecord]) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut keys = HashSet::new();
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO tournaments
                 (tournament_page, date, name, organizer, format, players, winner, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(tournament_page) DO UPDATE SET
                    date = excluded.date,
                    name = excluded.name,
                    organizer = excluded.organizer,
                    format = excluded.format,
                    players = excluded.players,
                    winner = excluded.winner,
                    updated_at = excluded.updated_at",
            )?;

            for t in tournaments {
                keys.insert(t.tournament_page.as_str());
                stmt.execute(params![
                    t.tournament_page,
                    t.date,
                    t.name,
                    t.organizer,
                    t.format,
                    t.players,
                    t.winner,
                    now
                ])?;
            }
        }
        tx.commit()?;
        Ok(keys.len())
    }

    fn upsert_participants(
        &mut self,
        participants: &[ParticipantRecord],
    ) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut keys = HashSet::new();
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO tournament_participants
                 (tournament_page, name, place, points, record, deck, decklist_link, matches_link, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(tournament_page, name) DO UPDATE SET
                    place = excluded.place,
                    points = excluded.points,
                    record = excluded.record,
                    deck = excluded.deck,
                    decklist_link = excluded.decklist_link,
                    matches_link = excluded.matches_link,
                    updated_at = excluded.updated_at",
            )?;

            for p in participants {
                keys.insert((p.tournament_page.as_str(), p.name.as_str()));
                stmt.execute(params![
                    p.tournament_page,
                    p.name,
                    p.place,
                    p.points,
                    p.record,
                    p.deck,
                    p.decklist_link,
                    p.matches_link,
                    now
                ])?;
            }
        }
        tx.commit()?;
        Ok(keys.len())
    }

    fn upsert_decks(&mut self, decks: &[DeckRecord]) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut keys = HashSet::new();
        {
            let mut deck_stmt = tx.prepare_cached(
                "INSERT INTO participant_deck
                 (tournament_page, player, decklist_link, card_count, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(tournament_page, player) DO UPDATE SET
                    decklist_link = excluded.decklist_link,
                    card_count = excluded.card_count,
                    updated_at = excluded.updated_at",
            )?;
            let mut clear_stmt = tx.prepare_cached(
                "DELETE FROM participant_deck_cards WHERE tournament_page = ?1 AND player = ?2",
            )?;
            let mut card_stmt = tx.prepare_cached(
                "INSERT INTO participant_deck_cards
                 (tournament_page, player, position, quantity, name, code)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for deck in decks {
                keys.insert((deck.tournament_page.as_str(), deck.player.as_str()));
                let card_count: u32 = deck.cards.iter().map(|c| c.quantity).sum();
                deck_stmt.execute(params![
                    deck.tournament_page,
                    deck.player,
                    deck.decklist_link,
                    card_count,
                    now
                ])?;

                clear_stmt.execute(params![deck.tournament_page, deck.player])?;
                for (position, card) in deck.cards.iter().enumerate() {
                    card_stmt.execute(params![
                        deck.tournament_page,
                        deck.player,
                        position as i64,
                        card.quantity,
                        card.name,
                        card.code
                    ])?;
                }
            }
        }
        tx.commit()?;
        Ok(keys.len())
    }

    fn upsert_matches(&mut self, matches: &[MatchRecord]) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut keys = HashSet::new();
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO participant_matches
                 (tournament_page, round, player, opponent, result, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(tournament_page, round, player) DO UPDATE SET
                    opponent = excluded.opponent,
                    result = excluded.result,
                    updated_at = excluded.updated_at",
            )?;

            for m in matches {
                keys.insert((m.tournament_page.as_str(), m.round.as_str(), m.player.as_str()));
                stmt.execute(params![
                    m.tournament_page,
                    m.round,
                    m.player,
                    m.opponent,
                    m.result.as_str(),
                    now
                ])?;
            }
        }
        tx.commit()?;
        Ok(keys.len())
    }

    fn get_deck(&self, tournament_page: &str, player: &str) -> StorageResult<Option<DeckRecord>> {
        let decklist_link: Option<String> = self
            .conn
            .query_row(
                "SELECT decklist_link FROM participant_deck WHERE tournament_page = ?1 AND player = ?2",
                params![tournament_page, player],
                |row| row.get(0),
            )
            .optional()?;

        let Some(decklist_link) = decklist_link else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT quantity, name, code FROM participant_deck_cards
             WHERE tournament_page = ?1 AND player = ?2 ORDER BY position",
        )?;
        let cards = stmt
            .query_map(params![tournament_page, player], |row| {
                Ok(CardEntry {
                    quantity: row.get(0)?,
                    name: row.get(1)?,
                    code: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(DeckRecord {
            tournament_page: tournament_page.to_string(),
            player: player.to_string(),
            decklist_link,
            cards,
        }))
    }

    // ===== Statistics =====

    fn count_rows(&self, table: Table) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.table_name()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
