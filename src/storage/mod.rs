//! Storage module for persisting sources and listings
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Source seeding and the administrative active toggle
//! - Listing upsert keyed by `(source_id, link)` with batch atomicity
//! - Publisher selection and the monotonic published flag

mod schema;
mod sqlite;
mod traits;

pub use sqlite::{SqliteStorage, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};
pub use traits::{Storage, StorageError, StorageResult};

use crate::model::{Category, Listing, SourceKind};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Opens or creates the storage database
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Represents a source in the database
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub kind: SourceKind,
    pub category: Category,
    pub adapter: String,
    pub active: bool,
    pub last_crawled: Option<String>,
}

impl SourceRecord {
    /// The string a channel username is derived from: the URL, else the name
    pub fn channel_origin(&self) -> &str {
        if self.url.trim().is_empty() {
            &self.name
        } else {
            &self.url
        }
    }
}

/// Represents a stored listing together with its bookkeeping columns
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub id: i64,
    pub source_id: i64,
    pub source_name: String,
    pub listing: Listing,
    pub created_at: String,
    pub published: bool,
}

/// Per-source status row for operational tooling
#[derive(Debug, Clone, PartialEq)]
pub struct SourceStats {
    pub name: String,
    pub kind: SourceKind,
    pub active: bool,
    pub total: u64,
    pub unpublished: u64,
    pub last_crawled: Option<String>,
}

/// Cloneable handle to one store shared by the crawl loops and the publisher
///
/// The lock is only held inside synchronous sections, never across an await.
#[derive(Clone)]
pub struct SharedStorage {
    inner: Arc<Mutex<SqliteStorage>>,
}

impl SharedStorage {
    pub fn new(storage: SqliteStorage) -> Self {
        Self {
            inner: Arc::new(Mutex::new(storage)),
        }
    }

    /// Locks the store; a poisoned lock is reported instead of panicking
    pub fn lock(&self) -> StorageResult<MutexGuard<'_, SqliteStorage>> {
        self.inner.lock().map_err(|_| StorageError::Poisoned)
    }
}
