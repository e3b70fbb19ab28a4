//! Output module for operator-facing reports
//!
//! This module handles:
//! - Per-source ingestion status for `--stats`
//! - Listing previews for single-pass runs

pub mod stats;

pub use stats::{format_statistics, load_statistics, print_statistics, RelayStatistics};

use crate::model::Listing;
use crate::text::clip;
use std::fmt::Write;

/// Renders up to `limit` listings as a short preview block
pub fn format_sample(source: &str, listings: &[Listing], limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{source}: {} listings", listings.len());
    for listing in listings.iter().take(limit) {
        let _ = writeln!(out, "  - {}", clip(&listing.title, 90));
        let _ = writeln!(out, "    {}", listing.link);
        if listing.salary_min.is_some() || listing.salary_max.is_some() {
            let range = match (listing.salary_min, listing.salary_max) {
                (Some(min), Some(max)) => format!("{min:.0}-{max:.0}"),
                (Some(v), None) | (None, Some(v)) => format!("{v:.0}"),
                (None, None) => String::new(),
            };
            let period = listing
                .period
                .map(|p| format!("/{}", p.display_unit()))
                .unwrap_or_default();
            let _ = writeln!(out, "    salary: {} {range}{period}", listing.currency);
        }
    }
    out
}
