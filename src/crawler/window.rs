//! Incremental date window over the listing
//!
//! The listing is assumed reverse-chronological. In windowed mode the first
//! tournament strictly older than the target month means every later page
//! is stale too, so the crawl stops after the current page.

use crate::records::TournamentRecord;
use crate::{DateParseError, HarvestError};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

/// A calendar year-month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetMonth {
    year: i32,
    month: u32,
}

impl TargetMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, HarvestError> {
        if !(1..=12).contains(&month) {
            return Err(HarvestError::InvalidMonth(format!("{:04}-{:02}", year, month)));
        }
        Ok(Self { year, month })
    }

    /// The current calendar month (UTC)
    pub fn current() -> Self {
        Self::of(Utc::now().date_naive())
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl FromStr for TargetMonth {
    type Err = HarvestError;

    /// Parses `YYYY-MM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HarvestError::InvalidMonth(s.to_string());

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }

        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl fmt::Display for TargetMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Crawl mode selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    /// Accept every record, never stop early
    Backfill,
    /// Accept only records dated in the target month
    Windowed(TargetMonth),
}

impl CrawlMode {
    /// `--backfill` wins; otherwise `--month`, defaulting to the current month
    pub fn resolve(backfill: bool, month: Option<&str>) -> Result<Self, HarvestError> {
        if backfill {
            return Ok(Self::Backfill);
        }

        let target = match month {
            Some(m) => m.parse()?,
            None => TargetMonth::current(),
        };
        Ok(Self::Windowed(target))
    }

    pub fn to_db_string(&self) -> String {
        match self {
            Self::Backfill => "backfill".to_string(),
            Self::Windowed(month) => format!("month:{}", month),
        }
    }
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backfill => f.write_str("backfill"),
            Self::Windowed(month) => write!(f, "windowed ({})", month),
        }
    }
}

/// Window filter state; `Stopped` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Scanning,
    Stopped,
}

/// Reads the calendar date of a tournament's ISO-ish date string
///
/// Accepts RFC 3339 timestamps and anything starting with `YYYY-MM-DD`.
pub fn parse_tournament_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let raw = raw.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc).date_naive());
    }

    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .ok_or_else(|| DateParseError(raw.to_string()))
}

/// Decides which listed tournaments to keep and when discovery must stop
///
/// One instance per crawl run.
#[derive(Debug)]
pub struct IncrementalWindowFilter {
    mode: CrawlMode,
    state: WindowState,
}

impl IncrementalWindowFilter {
    pub fn new(mode: CrawlMode) -> Self {
        Self {
            mode,
            state: WindowState::Scanning,
        }
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn is_stopped(&self) -> bool {
        self.state == WindowState::Stopped
    }

    /// Filters one listing page and updates the stop state
    ///
    /// The kept batch of the page that triggers the stop is still returned.
    /// Once stopped, further pages yield nothing.
    pub fn filter_page(&mut self, records: Vec<TournamentRecord>) -> Vec<TournamentRecord> {
        if self.is_stopped() {
            return Vec::new();
        }

        let target = match self.mode {
            CrawlMode::Backfill => return records,
            CrawlMode::Windowed(target) => target,
        };

        let mut stop = false;
        let mut kept = Vec::with_capacity(records.len());

        for record in records {
            let Some(raw) = record.date.as_deref() else {
                tracing::warn!("Skipping undated tournament {}", record.tournament_page);
                continue;
            };

            let month = match parse_tournament_date(raw) {
                Ok(date) => TargetMonth::of(date),
                Err(e) => {
                    tracing::warn!("Skipping tournament {}: {}", record.tournament_page, e);
                    continue;
                }
            };

            if month == target {
                kept.push(record);
            } else if month < target {
                stop = true;
            }
        }

        if stop {
            tracing::info!(
                "Reached tournaments older than {}, stopping discovery",
                target
            );
            self.state = WindowState::Stopped;
        }

        kept
    }
}
