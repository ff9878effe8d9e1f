//! Statistics generation from the harvest database
//!
//! This module provides functionality for extracting and displaying
//! harvest statistics from the storage layer.

use crate::storage::{RowCounts, RunRecord, Storage, Table};
use crate::HarvestError;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Stored rows per stream
    pub rows: RowCounts,

    /// Most recent crawl run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<HarvestStatistics, HarvestError> {
    Ok(HarvestStatistics {
        rows: storage.row_counts()?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Stored rows:");
    for table in Table::ALL {
        println!("  {}: {}", table.table_name(), stats.rows.get(table));
    }
    println!();

    let Some(run) = &stats.latest_run else {
        println!("No crawl runs recorded");
        return;
    };

    println!("Latest run:");
    println!("  ID: {}", run.id);
    println!("  Mode: {}", run.mode);
    println!("  Status: {}", run.status.to_db_string());
    println!("  Started: {}", run.started_at);
    if let Some(finished) = &run.finished_at {
        println!("  Finished: {}", finished);
    }
    println!("  Config hash: {}", run.config_hash);
    println!(
        "  Written: {} tournaments, {} participants, {} decks, {} matches",
        run.counts.tournaments, run.counts.participants, run.counts.decks, run.counts.matches
    );
    println!("  Item failures: {}", run.item_failures);
    if let Some(error) = &run.error_message {
        println!("  Error: {}", error);
    }
}
