//! Statistics generation from the relay database
//!
//! This module provides functionality for extracting and displaying
//! per-source ingestion status. A source whose `last_crawled` stops
//! advancing is failing every tick, so that column is always shown.

use crate::storage::{SourceStats, Storage, StorageResult};
use std::fmt::Write;

/// Relay statistics summary
#[derive(Debug, Clone)]
pub struct RelayStatistics {
    /// Total number of stored listings
    pub total_listings: u64,

    /// Listings still waiting for the publisher
    pub unpublished: u64,

    /// One row per configured source, by name
    pub sources: Vec<SourceStats>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(RelayStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<RelayStatistics> {
    Ok(RelayStatistics {
        total_listings: storage.count_listings()?,
        unpublished: storage.count_unpublished()?,
        sources: storage.source_stats()?,
    })
}

/// Renders statistics as the plain-text table printed by `--stats`
pub fn format_statistics(stats: &RelayStatistics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Relay Statistics ===\n");
    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Total listings: {}", stats.total_listings);
    let _ = writeln!(out, "  Unpublished: {}", stats.unpublished);
    let _ = writeln!(out, "  Sources: {}", stats.sources.len());
    let _ = writeln!(out);

    let width = stats
        .sources
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Source".len());

    let _ = writeln!(
        out,
        "  {:<width$}  {:<7}  {:<6}  {:>7}  {:>11}  Last crawled",
        "Source", "Kind", "Active", "Total", "Unpublished"
    );
    for source in &stats.sources {
        let _ = writeln!(
            out,
            "  {:<width$}  {:<7}  {:<6}  {:>7}  {:>11}  {}",
            source.name,
            source.kind.to_db_string(),
            if source.active { "yes" } else { "no" },
            source.total,
            source.unpublished,
            source.last_crawled.as_deref().unwrap_or("never"),
        );
    }
    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RelayStatistics) {
    print!("{}", format_statistics(stats));
}
