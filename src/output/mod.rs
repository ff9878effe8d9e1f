//! Output module for crawl reports and statistics
//!
//! This module handles:
//! - The per-run crawl report returned by the coordinator
//! - Printing the report summary after a crawl
//! - Database statistics for `--stats`

pub mod stats;

pub use stats::{load_statistics, print_statistics, HarvestStatistics};

use crate::crawler::CrawlMode;
use crate::storage::{RowCounts, Table};
use crate::HarvestError;

/// Outcome of one completed crawl
#[derive(Debug)]
pub struct CrawlReport {
    pub run_id: i64,
    pub mode: CrawlMode,

    /// Listing pages fetched during discovery
    pub pages_fetched: u32,

    /// Whether the window filter ended discovery before a short page
    pub stopped_early: bool,

    /// Records written per stream by this run
    pub counts: RowCounts,

    /// Per-item extraction failures, in completion order
    pub failures: Vec<HarvestError>,
}

impl CrawlReport {
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Prints a crawl report to stdout
///
/// # Arguments
///
/// * `report` - The report to display
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report (run {}) ===\n", report.run_id);

    println!("Mode: {}", report.mode);
    println!(
        "Listing pages fetched: {}{}",
        report.pages_fetched,
        if report.stopped_early {
            " (stopped at window boundary)"
        } else {
            ""
        }
    );
    println!();

    println!("Records written:");
    for table in Table::ALL {
        println!("  {}: {}", table.table_name(), report.counts.get(table));
    }
    println!();

    if report.failures.is_empty() {
        println!("No item failures");
    } else {
        println!("Item failures ({}):", report.failure_count());
        for failure in &report.failures {
            println!("  - {}", failure);
        }
    }
}
