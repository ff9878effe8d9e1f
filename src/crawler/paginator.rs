//! Listing page discovery
//!
//! One call fetches and parses one listing page. Loop control stays with the
//! caller, so the window filter can veto continuation independently of the
//! short-page rule.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::RecordParser;
use crate::records::{TournamentQuery, TournamentRecord};
use crate::ExtractError;

/// Path of the completed-tournaments listing, relative to the site root
pub const LISTING_PATH: &str = "/tournaments/completed";

/// Records of one listing page plus the continuation flag
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub records: Vec<TournamentRecord>,
    /// Listing rows on the page, with or without a usable record
    pub rows: usize,
    /// `rows >= show`; a short page is the end-of-data signal
    pub more: bool,
}

pub struct Paginator<'a> {
    fetcher: &'a dyn PageFetcher,
    parser: &'a dyn RecordParser,
    listing_url: String,
}

impl<'a> Paginator<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        parser: &'a dyn RecordParser,
        base_url: &str,
    ) -> Self {
        Self {
            fetcher,
            parser,
            listing_url: format!("{}{}", base_url.trim_end_matches('/'), LISTING_PATH),
        }
    }

    /// Fetches and parses the page `query` currently points at
    ///
    /// Does not advance the cursor. Errors are returned as-is; the caller
    /// decides that they are fatal.
    pub async fn next_page(&self, query: &TournamentQuery) -> Result<ListingPage, ExtractError> {
        tracing::debug!("Fetching listing page {}", query.page());

        let body = self
            .fetcher
            .fetch(&self.listing_url, &query.to_params())
            .await?;
        let listing = self.parser.parse_tournaments(&body)?;
        let more = listing.rows >= query.show() as usize;

        tracing::debug!(
            "Listing page {} returned {} rows, {} tournaments (more: {})",
            query.page(),
            listing.rows,
            listing.records.len(),
            more
        );

        Ok(ListingPage {
            records: listing.records,
            rows: listing.rows,
            more,
        })
    }
}
