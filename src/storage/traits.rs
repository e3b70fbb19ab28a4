//! Storage traits and error types
//!
//! This module defines the trait interface for the store boundary and the
//! associated error type.

use crate::config::SourceEntry;
use crate::model::{Listing, SourceKind};
use crate::storage::{ListingRecord, SourceRecord, SourceStats};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Listing not found: {0}")]
    ListingNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// The `(source_id, link)` uniqueness constraint is the only coordination
/// primitive between the crawl loops and the publisher.
pub trait Storage {
    // ===== Source Management =====

    /// Inserts a source or refreshes the one with the same name
    ///
    /// # Arguments
    ///
    /// * `entry` - The configured source
    ///
    /// # Returns
    ///
    /// The source ID (either newly created or existing). The active flag is
    /// only set on creation so an administrative toggle survives reseeding.
    fn seed_source(&mut self, entry: &SourceEntry) -> StorageResult<i64>;

    /// Gets a source by its unique name
    fn get_source_by_name(&self, name: &str) -> StorageResult<Option<SourceRecord>>;

    /// Gets all sources ordered by ID
    fn list_sources(&self) -> StorageResult<Vec<SourceRecord>>;

    /// Gets active sources of one kind ordered by ID
    fn list_active_sources(&self, kind: SourceKind) -> StorageResult<Vec<SourceRecord>>;

    /// Flips the active flag; returns false when no source has that name
    fn set_source_active(&mut self, name: &str, active: bool) -> StorageResult<bool>;

    // ===== Listing Management =====

    /// Upserts a batch of listings for one source in a single transaction
    ///
    /// Existing rows are refreshed without touching `published` or
    /// `created_at`. The source's `last_crawled` is set to now as part of the
    /// same transaction, even for an empty batch.
    ///
    /// # Returns
    ///
    /// The number of rows that did not exist before the call
    fn persist_listings(&mut self, source_id: i64, listings: &[Listing]) -> StorageResult<usize>;

    /// Gets a listing by its dedup key
    fn get_listing(&self, source_id: i64, link: &str) -> StorageResult<Option<ListingRecord>>;

    /// Gets the oldest unpublished listing across all sources
    fn next_unpublished(&self) -> StorageResult<Option<ListingRecord>>;

    /// Sets `published`; never clears it
    fn mark_published(&mut self, listing_id: i64) -> StorageResult<()>;

    /// Re-parses salaries of listings that have neither min nor max
    ///
    /// # Returns
    ///
    /// The number of listings that were updated
    fn backfill_salary(&mut self) -> StorageResult<usize>;

    // ===== Statistics =====

    /// Counts every stored listing
    fn count_listings(&self) -> StorageResult<u64>;

    /// Counts listings still waiting for the publisher
    fn count_unpublished(&self) -> StorageResult<u64>;

    /// Per-source listing totals and last crawl time
    fn source_stats(&self) -> StorageResult<Vec<SourceStats>>;
}
