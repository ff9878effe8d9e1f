//! Record parsing for the source site's HTML pages
//!
//! The pipeline only depends on the [`RecordParser`] trait. [`HtmlRecordParser`]
//! is the implementation for the results site's current layout:
//! - Listing page: one table row per tournament, metadata in `data-*` attributes
//! - Standings page: a header row naming the columns, one row per player
//! - Decklist page: one `<p>` per card line inside `.cards` containers
//! - Player page: match history table inside `div.history`

use crate::records::{CardEntry, MatchRecord, MatchResult, ParticipantRecord, TournamentRecord};
use crate::ParseError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;
use url::Url;

static LISTING_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.main table").expect("valid listing selector"));
static STANDINGS_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.standings table").expect("valid standings selector"));
static HISTORY_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.history table").expect("valid history selector"));
static CARD_LINES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".cards p").expect("valid card selector"));
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("valid row selector"));
static HEADER_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("valid header selector"));
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("valid cell selector"));
static LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid link selector"));
static TITLED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[title], img[alt]").expect("valid title selector"));

/// `<quantity> <name> [(<code>)]`
static CARD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s+(.+?)(?:\s+\(([^()]+)\))?$").expect("valid card line regex")
});

/// One parsed tournament listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingRows {
    /// Data rows on the page, including rows that yielded no record
    pub rows: usize,
    pub records: Vec<TournamentRecord>,
}

/// Turns raw page bodies into typed records
pub trait RecordParser: Send + Sync {
    /// Parses one tournament listing page
    fn parse_tournaments(&self, body: &str) -> Result<ListingRows, ParseError>;

    /// Parses the standings table of one tournament
    fn parse_participants(
        &self,
        tournament_page: &str,
        body: &str,
    ) -> Result<Vec<ParticipantRecord>, ParseError>;

    /// Parses the card lines of one decklist page
    fn parse_decklist(&self, body: &str) -> Result<Vec<CardEntry>, ParseError>;

    /// Parses one participant's match history
    fn parse_matches(
        &self,
        participant: &ParticipantRecord,
        body: &str,
    ) -> Result<Vec<MatchRecord>, ParseError>;
}

/// `RecordParser` for the results site, built on `scraper`
#[derive(Debug, Clone)]
pub struct HtmlRecordParser {
    base_url: Url,
}

impl HtmlRecordParser {
    /// Creates a parser that resolves relative links against `base_url`
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    fn absolute_link(&self, element: ElementRef<'_>) -> Option<String> {
        let href = element
            .select(&LINK)
            .next()
            .and_then(|a| a.value().attr("href"))?
            .trim();

        if href.is_empty() {
            return None;
        }

        self.base_url.join(href).ok().map(|url| url.to_string())
    }
}

impl RecordParser for HtmlRecordParser {
    fn parse_tournaments(&self, body: &str) -> Result<ListingRows, ParseError> {
        let document = Html::parse_document(body);
        let table = document
            .select(&LISTING_TABLE)
            .next()
            .ok_or(ParseError::MissingElement("tournament listing table"))?;

        let mut listing = ListingRows::default();
        for row in data_rows(table) {
            listing.rows += 1;
            let Some(tournament_page) = self.absolute_link(row) else {
                tracing::debug!("Skipping listing row without a tournament link");
                continue;
            };

            let attr = |name: &str| {
                row.value()
                    .attr(name)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            };

            listing.records.push(TournamentRecord {
                tournament_page,
                date: attr("data-date"),
                name: attr("data-name"),
                organizer: attr("data-organizer"),
                format: attr("data-format"),
                players: attr("data-players").and_then(|p| p.parse().ok()),
                winner: attr("data-winner"),
            });
        }

        Ok(listing)
    }

    fn parse_participants(
        &self,
        tournament_page: &str,
        body: &str,
    ) -> Result<Vec<ParticipantRecord>, ParseError> {
        let document = Html::parse_document(body);
        let table = document
            .select(&STANDINGS_TABLE)
            .next()
            .ok_or(ParseError::MissingElement("standings table"))?;

        let headers: Vec<String> = table
            .select(&ROW)
            .find(|row| row.select(&HEADER_CELL).next().is_some())
            .ok_or(ParseError::MissingElement("standings header row"))?
            .select(&HEADER_CELL)
            .map(cell_text)
            .collect();

        if !headers.iter().any(|h| h == "Name") {
            return Err(ParseError::UnexpectedHeaders(headers));
        }

        let mut participants = Vec::new();
        for row in data_rows(table) {
            let cells: HashMap<&str, ElementRef<'_>> = headers
                .iter()
                .map(String::as_str)
                .zip(row.select(&CELL))
                .collect();

            let text = |column: &str| {
                cells
                    .get(column)
                    .map(|cell| cell_text(*cell))
                    .filter(|t| !t.is_empty())
            };

            let Some(name) = text("Name") else {
                continue;
            };

            participants.push(ParticipantRecord {
                tournament_page: tournament_page.to_string(),
                place: text("Place").and_then(|p| parse_place(&p)),
                points: text("Points"),
                record: text("Record"),
                deck: cells.get("Deck").and_then(|cell| deck_label(*cell)),
                decklist_link: cells.get("List").and_then(|cell| self.absolute_link(*cell)),
                matches_link: cells.get("Name").and_then(|cell| self.absolute_link(*cell)),
                name,
            });
        }

        Ok(participants)
    }

    fn parse_decklist(&self, body: &str) -> Result<Vec<CardEntry>, ParseError> {
        let document = Html::parse_document(body);

        document
            .select(&CARD_LINES)
            .map(cell_text)
            .filter(|line| !line.is_empty())
            .map(|line| parse_card(&line))
            .collect()
    }

    fn parse_matches(
        &self,
        participant: &ParticipantRecord,
        body: &str,
    ) -> Result<Vec<MatchRecord>, ParseError> {
        let document = Html::parse_document(body);
        let Some(table) = document.select(&HISTORY_TABLE).next() else {
            return Ok(Vec::new());
        };

        let mut matches = Vec::new();
        for row in data_rows(table) {
            // Round, Result, Opponent, Opponent deck, Score
            let cols: Vec<String> = row.select(&CELL).map(cell_text).collect();
            if cols.len() < 3 {
                continue;
            }

            let result = match cols[1].parse::<MatchResult>() {
                Ok(result) => result,
                Err(e) => {
                    tracing::debug!(
                        "Skipping round '{}' for {}: {}",
                        cols[0],
                        participant.name,
                        e
                    );
                    continue;
                }
            };

            matches.push(MatchRecord {
                tournament_page: participant.tournament_page.clone(),
                round: cols[0].clone(),
                player: participant.name.clone(),
                opponent: Some(cols[2].clone()).filter(|o| !o.is_empty()),
                result,
            });
        }

        Ok(matches)
    }
}

/// Parses a single decklist line such as `2 Pikachu ex (A1 96)`
pub fn parse_card(line: &str) -> Result<CardEntry, ParseError> {
    let captures = CARD_LINE
        .captures(line.trim())
        .ok_or_else(|| ParseError::InvalidCard(line.to_string()))?;

    let quantity = captures[1]
        .parse()
        .map_err(|_| ParseError::InvalidCard(line.to_string()))?;

    Ok(CardEntry {
        quantity,
        name: captures[2].trim().to_string(),
        code: captures.get(3).map(|m| m.as_str().trim().to_string()),
    })
}

/// Table rows that carry data cells (header rows are skipped)
fn data_rows(table: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    table
        .select(&ROW)
        .filter(|row| row.select(&CELL).next().is_some())
}

/// Whitespace-normalized text content of an element
fn cell_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Deck cells often hold only archetype icons; fall back to their titles
fn deck_label(cell: ElementRef<'_>) -> Option<String> {
    let text = cell_text(cell);
    if !text.is_empty() {
        return Some(text);
    }

    cell.select(&TITLED)
        .find_map(|el| el.value().attr("title").or_else(|| el.value().attr("alt")))
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
}

/// Accepts `1`, `1st`, `T8` style placements and keeps the number
fn parse_place(text: &str) -> Option<u32> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
