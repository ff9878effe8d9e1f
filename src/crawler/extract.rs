//! Per-item extraction workers for the fan-out stages
//!
//! Each function fetches one detail page and hands the body to the parser.
//! A participant without a decklist or match-history link is not an error:
//! it yields no deck and no matches, without touching the network.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::RecordParser;
use crate::records::{DeckRecord, MatchRecord, ParticipantRecord, TournamentRecord};
use crate::ExtractError;

/// Fetches and parses one tournament's standings
pub async fn extract_participants(
    fetcher: &dyn PageFetcher,
    parser: &dyn RecordParser,
    tournament: &TournamentRecord,
) -> Result<Vec<ParticipantRecord>, ExtractError> {
    let body = fetcher.fetch(&tournament.tournament_page, &[]).await?;
    let participants = parser.parse_participants(&tournament.tournament_page, &body)?;

    tracing::debug!(
        "{} participants in {}",
        participants.len(),
        tournament.tournament_page
    );
    Ok(participants)
}

/// Fetches and parses one participant's decklist
pub async fn extract_deck(
    fetcher: &dyn PageFetcher,
    parser: &dyn RecordParser,
    participant: &ParticipantRecord,
) -> Result<Option<DeckRecord>, ExtractError> {
    let Some(link) = participant.decklist_link.as_deref() else {
        tracing::debug!(
            "No decklist for {} in {}",
            participant.name,
            participant.tournament_page
        );
        return Ok(None);
    };

    let body = fetcher.fetch(link, &[]).await?;
    let cards = parser.parse_decklist(&body)?;

    Ok(Some(DeckRecord {
        tournament_page: participant.tournament_page.clone(),
        player: participant.name.clone(),
        decklist_link: link.to_string(),
        cards,
    }))
}

/// Fetches and parses one participant's match history
pub async fn extract_matches(
    fetcher: &dyn PageFetcher,
    parser: &dyn RecordParser,
    participant: &ParticipantRecord,
) -> Result<Vec<MatchRecord>, ExtractError> {
    let Some(link) = participant.matches_link.as_deref() else {
        return Ok(Vec::new());
    };

    let body = fetcher.fetch(link, &[]).await?;
    Ok(parser.parse_matches(participant, &body)?)
}
