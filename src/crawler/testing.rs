//! In-process fakes for crawler unit tests
//!
//! `FakeFetcher` serves canned bodies keyed by URL (listing pages by page
//! number, optionally per time window); `StubParser` reads a line-oriented `a|b|c` format so tests can
//! describe pages without HTML.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::{parse_card, ListingRows, RecordParser};
use crate::records::{CardEntry, MatchRecord, ParticipantRecord, TournamentRecord};
use crate::{FetchError, ParseError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub fn tournament(page: &str, date: &str) -> TournamentRecord {
    TournamentRecord {
        tournament_page: page.to_string(),
        date: Some(date.to_string()).filter(|d| d != "-"),
        name: None,
        organizer: None,
        format: None,
        players: None,
        winner: None,
    }
}

pub fn participant(
    tournament_page: &str,
    name: &str,
    decklist_link: Option<&str>,
    matches_link: Option<&str>,
) -> ParticipantRecord {
    ParticipantRecord {
        tournament_page: tournament_page.to_string(),
        name: name.to_string(),
        place: None,
        points: None,
        record: None,
        deck: None,
        decklist_link: decklist_link.map(str::to_string),
        matches_link: matches_link.map(str::to_string),
    }
}

#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, Result<String, u16>>,
    requested: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `tournaments` as listing page `page` for any time window
    pub fn listing(mut self, page: u32, tournaments: &[TournamentRecord]) -> Self {
        self.pages.insert(listing_key(page), Ok(listing_body(tournaments)));
        self
    }

    /// Serves `tournaments` as listing page `page` only when the request
    /// asks for the `time` window
    pub fn listing_in_window(
        mut self,
        time: &str,
        page: u32,
        tournaments: &[TournamentRecord],
    ) -> Self {
        self.pages.insert(
            windowed_listing_key(time, &page.to_string()),
            Ok(listing_body(tournaments)),
        );
        self
    }

    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    /// Makes `url` answer with HTTP 500
    pub fn failing(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), Err(500));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

fn listing_body(tournaments: &[TournamentRecord]) -> String {
    tournaments
        .iter()
        .map(|t| {
            format!(
                "{}|{}",
                t.tournament_page,
                t.date.as_deref().unwrap_or("-")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn listing_key(page: u32) -> String {
    format!("listing:{}", page)
}

fn windowed_listing_key(time: &str, page: &str) -> String {
    format!("listing:{}:{}", time, page)
}

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, params: &[(String, String)]) -> Result<String, FetchError> {
        let (keys, logged) = match param(params, "page") {
            Some(page) => {
                let time = param(params, "time").unwrap_or_default();
                (
                    vec![windowed_listing_key(time, page), format!("listing:{}", page)],
                    format!("{}?time={}&page={}", url, time, page),
                )
            }
            None => (vec![url.to_string()], url.to_string()),
        };
        self.requested.lock().unwrap().push(logged);

        // Let sibling futures interleave like real network calls
        tokio::task::yield_now().await;

        match keys.iter().find_map(|key| self.pages.get(key)) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

pub struct StubParser;

fn fields(line: &str) -> Vec<Option<String>> {
    line.split('|')
        .map(|f| Some(f.trim().to_string()).filter(|f| !f.is_empty() && f != "-"))
        .collect()
}

fn lines(body: &str) -> impl Iterator<Item = &str> {
    body.lines().map(str::trim).filter(|l| !l.is_empty())
}

impl RecordParser for StubParser {
    /// A line whose page field is `-` stands for a row without a link
    fn parse_tournaments(&self, body: &str) -> Result<ListingRows, ParseError> {
        let mut listing = ListingRows::default();
        for line in lines(body) {
            listing.rows += 1;
            let f = fields(line);
            if let Some(page) = f.first().cloned().flatten() {
                let date = f.get(1).cloned().flatten();
                listing
                    .records
                    .push(tournament(&page, date.as_deref().unwrap_or("-")));
            }
        }
        Ok(listing)
    }

    fn parse_participants(
        &self,
        tournament_page: &str,
        body: &str,
    ) -> Result<Vec<ParticipantRecord>, ParseError> {
        lines(body)
            .map(|line| {
                let f = fields(line);
                let name = f
                    .first()
                    .cloned()
                    .flatten()
                    .ok_or(ParseError::MissingElement("name"))?;
                let link = |i: usize| f.get(i).cloned().flatten();
                Ok(participant(
                    tournament_page,
                    &name,
                    link(1).as_deref(),
                    link(2).as_deref(),
                ))
            })
            .collect()
    }

    fn parse_decklist(&self, body: &str) -> Result<Vec<CardEntry>, ParseError> {
        lines(body).map(parse_card).collect()
    }

    fn parse_matches(
        &self,
        participant: &ParticipantRecord,
        body: &str,
    ) -> Result<Vec<MatchRecord>, ParseError> {
        lines(body)
            .map(|line| {
                let f = fields(line);
                let round = f
                    .first()
                    .cloned()
                    .flatten()
                    .ok_or(ParseError::MissingElement("round"))?;
                let result = f
                    .get(1)
                    .cloned()
                    .flatten()
                    .and_then(|r| r.parse().ok())
                    .ok_or(ParseError::MissingElement("result"))?;
                Ok(MatchRecord {
                    tournament_page: participant.tournament_page.clone(),
                    round,
                    player: participant.name.clone(),
                    opponent: f.get(2).cloned().flatten(),
                    result,
                })
            })
            .collect()
    }
}
