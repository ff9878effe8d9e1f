use crate::config::SourceConfig;

/// Listing time window requested when none is configured
pub const ALL_TIME: &str = "all";

/// Parameters of the tournament listing request
///
/// Only `page` changes during a crawl, and only through [`increment_page`].
///
/// [`increment_page`]: TournamentQuery::increment_page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentQuery {
    game: String,
    format: String,
    platform: String,
    kind: String,
    time: String,
    show: u32,
    page: u32,
}

impl TournamentQuery {
    /// Builds the first-page query from the source configuration
    ///
    /// Without a configured time window every listed tournament is
    /// requested; the crawl window bounds discovery instead.
    pub fn from_source(source: &SourceConfig) -> Self {
        Self {
            game: source.game.clone(),
            format: source.format.clone(),
            platform: source.platform.clone(),
            kind: source.kind.clone(),
            time: source.time.clone().unwrap_or_else(|| ALL_TIME.to_string()),
            show: source.show,
            page: 1,
        }
    }

    /// Replaces the listing time window
    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    /// Requested page size
    pub fn show(&self) -> u32 {
        self.show
    }

    /// The current 1-based page number
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Advances the cursor to the next listing page
    pub fn increment_page(&mut self) {
        self.page += 1;
    }

    /// Flat key/value parameters for the listing GET
    pub fn to_params(&self) -> Vec<(String, String)> {
        vec![
            ("game".to_string(), self.game.clone()),
            ("format".to_string(), self.format.clone()),
            ("platform".to_string(), self.platform.clone()),
            ("type".to_string(), self.kind.clone()),
            ("time".to_string(), self.time.clone()),
            ("show".to_string(), self.show.to_string()),
            ("page".to_string(), self.page.to_string()),
        ]
    }
}
