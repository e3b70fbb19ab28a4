//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::config::SourceEntry;
use crate::crawler::salary_text;
use crate::model::{period_to_db, Category, Extras, Listing, PayPeriod, SourceKind};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{ListingRecord, SourceRecord, SourceStats};
use crate::text::{clip, parse_salary};
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// Stored titles are clipped to this many characters
pub const MAX_TITLE_LEN: usize = 255;

/// Stored descriptions are clipped to this many characters
pub const MAX_DESCRIPTION_LEN: usize = 8000;

const SOURCE_COLUMNS: &str = "id, name, url, kind, category, adapter, active, last_crawled";

const LISTING_SELECT: &str = "
    SELECT l.id, l.source_id, s.name, l.title, l.description, l.link, l.category,
           l.company, l.location, l.salary_min, l.salary_max, l.currency, l.period,
           l.tags, l.extras, l.raw_text, l.created_at, l.published
    FROM listings l
    JOIN sources s ON s.id = l.source_id";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file; missing parent
    ///   directories are created
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing and `--once` runs)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_source(row: &Row<'_>) -> rusqlite::Result<SourceRecord> {
    Ok(SourceRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        kind: SourceKind::from_db_string(&row.get::<_, String>(3)?).unwrap_or(SourceKind::Website),
        category: Category::from_db_string(&row.get::<_, String>(4)?).unwrap_or(Category::Job),
        adapter: row.get(5)?,
        active: row.get(6)?,
        last_crawled: row.get(7)?,
    })
}

fn row_to_listing(row: &Row<'_>) -> rusqlite::Result<ListingRecord> {
    let tags: String = row.get(13)?;
    let extras: String = row.get(14)?;

    Ok(ListingRecord {
        id: row.get(0)?,
        source_id: row.get(1)?,
        source_name: row.get(2)?,
        listing: Listing {
            title: row.get(3)?,
            description: row.get(4)?,
            link: row.get(5)?,
            category: Category::from_db_string(&row.get::<_, String>(6)?)
                .unwrap_or(Category::Job),
            company: row.get(7)?,
            location: row.get(8)?,
            salary_min: row.get(9)?,
            salary_max: row.get(10)?,
            currency: row.get(11)?,
            period: PayPeriod::from_db_string(&row.get::<_, String>(12)?),
            tags: serde_json::from_str(&tags).unwrap_or_default(),
            extras: serde_json::from_str::<Extras>(&extras).unwrap_or_default(),
            raw_text: row.get(15)?,
        },
        created_at: row.get(16)?,
        published: row.get(17)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Source Management =====

    fn seed_source(&mut self, entry: &SourceEntry) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO sources (name, url, kind, category, adapter, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(name) DO UPDATE SET
                url = excluded.url,
                kind = excluded.kind,
                category = excluded.category,
                adapter = excluded.adapter",
            params![
                entry.name.trim(),
                entry.url.trim(),
                entry.kind.to_db_string(),
                entry.category.to_db_string(),
                entry.adapter.trim(),
                entry.active,
            ],
        )?;

        let id = self.conn.query_row(
            "SELECT id FROM sources WHERE name = ?1",
            params![entry.name.trim()],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn get_source_by_name(&self, name: &str) -> StorageResult<Option<SourceRecord>> {
        let source = self
            .conn
            .query_row(
                &format!("SELECT {SOURCE_COLUMNS} FROM sources WHERE name = ?1"),
                params![name],
                row_to_source,
            )
            .optional()?;
        Ok(source)
    }

    fn list_sources(&self) -> StorageResult<Vec<SourceRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {SOURCE_COLUMNS} FROM sources ORDER BY id"))?;
        let sources = stmt
            .query_map([], row_to_source)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sources)
    }

    fn list_active_sources(&self, kind: SourceKind) -> StorageResult<Vec<SourceRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SOURCE_COLUMNS} FROM sources WHERE kind = ?1 AND active = 1 ORDER BY id"
        ))?;
        let sources = stmt
            .query_map(params![kind.to_db_string()], row_to_source)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sources)
    }

    fn set_source_active(&mut self, name: &str, active: bool) -> StorageResult<bool> {
        let changed = self.conn.execute(
            "UPDATE sources SET active = ?1 WHERE name = ?2",
            params![active, name],
        )?;
        Ok(changed > 0)
    }

    // ===== Listing Management =====

    fn persist_listings(&mut self, source_id: i64, listings: &[Listing]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let mut created = 0;

        {
            let mut exists =
                tx.prepare("SELECT 1 FROM listings WHERE source_id = ?1 AND link = ?2")?;
            let mut upsert = tx.prepare(
                "INSERT INTO listings (
                    source_id, title, description, link, category, company, location,
                    salary_min, salary_max, currency, period, tags, extras, raw_text, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                 ON CONFLICT(source_id, link) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    category = excluded.category,
                    company = excluded.company,
                    location = excluded.location,
                    salary_min = excluded.salary_min,
                    salary_max = excluded.salary_max,
                    currency = excluded.currency,
                    period = excluded.period,
                    tags = excluded.tags,
                    extras = excluded.extras,
                    raw_text = excluded.raw_text",
            )?;

            for listing in listings {
                let is_new = !exists.exists(params![source_id, listing.link])?;

                upsert.execute(params![
                    source_id,
                    clip(&listing.title, MAX_TITLE_LEN),
                    clip(&listing.description, MAX_DESCRIPTION_LEN),
                    listing.link,
                    listing.category.to_db_string(),
                    listing.company,
                    listing.location,
                    listing.salary_min,
                    listing.salary_max,
                    listing.currency,
                    period_to_db(listing.period),
                    serde_json::to_string(&listing.tags)?,
                    serde_json::to_string(&listing.extras)?,
                    listing.raw_text,
                    now_timestamp(),
                ])?;

                if is_new {
                    created += 1;
                }
            }
        }

        let touched = tx.execute(
            "UPDATE sources SET last_crawled = ?1 WHERE id = ?2",
            params![now_timestamp(), source_id],
        )?;
        if touched == 0 {
            // dropping the transaction rolls the batch back
            return Err(StorageError::SourceNotFound(source_id.to_string()));
        }

        tx.commit()?;
        Ok(created)
    }

    fn get_listing(&self, source_id: i64, link: &str) -> StorageResult<Option<ListingRecord>> {
        let listing = self
            .conn
            .query_row(
                &format!("{LISTING_SELECT} WHERE l.source_id = ?1 AND l.link = ?2"),
                params![source_id, link],
                row_to_listing,
            )
            .optional()?;
        Ok(listing)
    }

    fn next_unpublished(&self) -> StorageResult<Option<ListingRecord>> {
        let listing = self
            .conn
            .query_row(
                &format!(
                    "{LISTING_SELECT} WHERE l.published = 0 ORDER BY l.created_at ASC, l.id ASC LIMIT 1"
                ),
                [],
                row_to_listing,
            )
            .optional()?;
        Ok(listing)
    }

    fn mark_published(&mut self, listing_id: i64) -> StorageResult<()> {
        let changed = self.conn.execute(
            "UPDATE listings SET published = 1 WHERE id = ?1",
            params![listing_id],
        )?;
        if changed == 0 {
            return Err(StorageError::ListingNotFound(listing_id));
        }
        Ok(())
    }

    fn backfill_salary(&mut self) -> StorageResult<usize> {
        let candidates: Vec<(i64, String, String, String, String)> = {
            let mut stmt = self.conn.prepare(
                "SELECT id, title, description, extras, currency FROM listings
                 WHERE salary_min IS NULL AND salary_max IS NULL",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let tx = self.conn.transaction()?;
        let mut updated = 0;

        for (id, title, description, extras, currency) in candidates {
            let extras: Extras = serde_json::from_str(&extras).unwrap_or_default();
            let salary = parse_salary(&salary_text(&title, &description, &extras));
            if salary.is_empty() {
                continue;
            }

            let currency = if salary.currency.is_empty() {
                currency.to_uppercase()
            } else {
                salary.currency.clone()
            };

            // an unparsed period keeps whatever was stored
            tx.execute(
                "UPDATE listings
                 SET salary_min = ?1, salary_max = ?2, currency = ?3,
                     period = CASE WHEN ?4 = '' THEN period ELSE ?4 END
                 WHERE id = ?5",
                params![
                    salary.min,
                    salary.max,
                    currency,
                    period_to_db(salary.period),
                    id
                ],
            )?;
            updated += 1;
        }

        tx.commit()?;
        Ok(updated)
    }

    // ===== Statistics =====

    fn count_listings(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_unpublished(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM listings WHERE published = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn source_stats(&self) -> StorageResult<Vec<SourceStats>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.name, s.kind, s.active, s.last_crawled,
                    COUNT(l.id),
                    COALESCE(SUM(CASE WHEN l.published = 0 THEN 1 ELSE 0 END), 0)
             FROM sources s
             LEFT JOIN listings l ON l.source_id = s.id
             GROUP BY s.id
             ORDER BY s.id",
        )?;

        let stats = stmt
            .query_map([], |row| {
                Ok(SourceStats {
                    name: row.get(0)?,
                    kind: SourceKind::from_db_string(&row.get::<_, String>(1)?)
                        .unwrap_or(SourceKind::Website),
                    active: row.get(2)?,
                    last_crawled: row.get(3)?,
                    total: row.get::<_, i64>(4)? as u64,
                    unpublished: row.get::<_, i64>(5)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn website(name: &str) -> SourceEntry {
        SourceEntry::website(name, "https://example.com", Category::Job, "remoteok")
    }

    fn listing(link: &str, title: &str) -> Listing {
        Listing {
            title: title.to_string(),
            description: "Build things".to_string(),
            link: link.to_string(),
            category: Category::Job,
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            salary_min: None,
            salary_max: None,
            currency: String::new(),
            period: None,
            tags: vec!["rust".to_string()],
            extras: Extras::new(),
            raw_text: String::new(),
        }
    }

    fn storage_with_source() -> (SqliteStorage, i64) {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let id = storage.seed_source(&website("RemoteOK")).unwrap();
        (storage, id)
    }

    #[test]
    fn test_create_in_memory() {
        assert!(SqliteStorage::new_in_memory().is_ok());
    }

    #[test]
    fn test_open_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("relay.db");
        assert!(SqliteStorage::new(&path).is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_seed_source_is_upsert_by_name() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let first = storage.seed_source(&website("RemoteOK")).unwrap();

        let mut changed = website("RemoteOK");
        changed.url = "https://remoteok.com".to_string();
        let second = storage.seed_source(&changed).unwrap();

        assert_eq!(first, second);
        let source = storage.get_source_by_name("RemoteOK").unwrap().unwrap();
        assert_eq!(source.url, "https://remoteok.com");
        assert_eq!(storage.list_sources().unwrap().len(), 1);
    }

    #[test]
    fn test_reseed_keeps_admin_toggle() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.seed_source(&website("RemoteOK")).unwrap();
        assert!(storage.set_source_active("RemoteOK", false).unwrap());

        storage.seed_source(&website("RemoteOK")).unwrap();

        assert!(storage
            .list_active_sources(SourceKind::Website)
            .unwrap()
            .is_empty());
        assert!(!storage.set_source_active("missing", true).unwrap());
    }

    #[test]
    fn test_persist_counts_new_rows_only() {
        let (mut storage, id) = storage_with_source();

        let batch = vec![listing("https://x/1", "One"), listing("https://x/2", "Two")];
        assert_eq!(storage.persist_listings(id, &batch).unwrap(), 2);
        assert_eq!(storage.persist_listings(id, &batch).unwrap(), 0);
        assert_eq!(storage.count_listings().unwrap(), 2);
    }

    #[test]
    fn test_reingest_refreshes_fields_but_keeps_published() {
        let (mut storage, id) = storage_with_source();

        storage
            .persist_listings(id, &[listing("https://x/1", "Old title")])
            .unwrap();
        let stored = storage.get_listing(id, "https://x/1").unwrap().unwrap();
        storage.mark_published(stored.id).unwrap();

        storage
            .persist_listings(id, &[listing("https://x/1", "New title")])
            .unwrap();

        let refreshed = storage.get_listing(id, "https://x/1").unwrap().unwrap();
        assert_eq!(refreshed.id, stored.id);
        assert_eq!(refreshed.listing.title, "New title");
        assert!(refreshed.published);
        assert_eq!(refreshed.created_at, stored.created_at);
    }

    #[test]
    fn test_same_link_on_two_sources_is_two_rows() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let a = storage.seed_source(&website("A")).unwrap();
        let b = storage.seed_source(&website("B")).unwrap();

        storage.persist_listings(a, &[listing("https://x/1", "T")]).unwrap();
        storage.persist_listings(b, &[listing("https://x/1", "T")]).unwrap();

        assert_eq!(storage.count_listings().unwrap(), 2);
    }

    #[test]
    fn test_empty_batch_touches_last_crawled() {
        let (mut storage, id) = storage_with_source();
        assert!(storage
            .get_source_by_name("RemoteOK")
            .unwrap()
            .unwrap()
            .last_crawled
            .is_none());

        assert_eq!(storage.persist_listings(id, &[]).unwrap(), 0);

        let source = storage.get_source_by_name("RemoteOK").unwrap().unwrap();
        assert!(source.last_crawled.is_some());
    }

    #[test]
    fn test_unknown_source_rolls_back_batch() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let result = storage.persist_listings(42, &[listing("https://x/1", "T")]);
        assert!(result.is_err());
        assert_eq!(storage.count_listings().unwrap(), 0);
    }

    #[test]
    fn test_long_fields_are_clipped() {
        let (mut storage, id) = storage_with_source();
        let mut long = listing("https://x/1", &"t".repeat(400));
        long.description = "d".repeat(9000);
        storage.persist_listings(id, &[long]).unwrap();

        let stored = storage.get_listing(id, "https://x/1").unwrap().unwrap();
        assert_eq!(stored.listing.title.chars().count(), MAX_TITLE_LEN);
        assert_eq!(
            stored.listing.description.chars().count(),
            MAX_DESCRIPTION_LEN
        );
    }

    #[test]
    fn test_next_unpublished_is_oldest_first() {
        let (mut storage, id) = storage_with_source();
        for i in 0..3 {
            storage
                .persist_listings(id, &[listing(&format!("https://x/{i}"), &format!("T{i}"))])
                .unwrap();
        }

        let first = storage.next_unpublished().unwrap().unwrap();
        assert_eq!(first.listing.link, "https://x/0");
        assert_eq!(first.source_name, "RemoteOK");

        storage.mark_published(first.id).unwrap();
        let second = storage.next_unpublished().unwrap().unwrap();
        assert_eq!(second.listing.link, "https://x/1");
        assert_eq!(storage.count_unpublished().unwrap(), 2);
    }

    #[test]
    fn test_mark_unknown_listing_fails() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert!(matches!(
            storage.mark_published(7),
            Err(StorageError::ListingNotFound(7))
        ));
    }

    #[test]
    fn test_tags_and_extras_roundtrip() {
        let (mut storage, id) = storage_with_source();
        let mut item = listing("https://x/1", "T");
        item.extras.insert("views".to_string(), json!("1.2K"));
        item.period = Some(PayPeriod::Monthly);
        item.salary_min = Some(3000.0);
        storage.persist_listings(id, &[item]).unwrap();

        let stored = storage.get_listing(id, "https://x/1").unwrap().unwrap();
        assert_eq!(stored.listing.tags, vec!["rust".to_string()]);
        assert_eq!(stored.listing.extras.get("views"), Some(&json!("1.2K")));
        assert_eq!(stored.listing.period, Some(PayPeriod::Monthly));
        assert_eq!(stored.listing.salary_min, Some(3000.0));
    }

    #[test]
    fn test_backfill_salary() {
        let (mut storage, id) = storage_with_source();
        let mut with_salary = listing("https://x/1", "Rust dev $80k-$120k/year");
        with_salary.description = String::new();
        let mut without = listing("https://x/2", "Rust dev");
        without.description = "Great team".to_string();
        storage
            .persist_listings(id, &[with_salary, without])
            .unwrap();

        assert_eq!(storage.backfill_salary().unwrap(), 1);

        let filled = storage.get_listing(id, "https://x/1").unwrap().unwrap();
        assert_eq!(filled.listing.salary_min, Some(80_000.0));
        assert_eq!(filled.listing.salary_max, Some(120_000.0));
        assert_eq!(filled.listing.currency, "USD");
        assert_eq!(filled.listing.period, Some(PayPeriod::Yearly));

        // nothing left to fill
        assert_eq!(storage.backfill_salary().unwrap(), 0);
    }

    #[test]
    fn test_backfill_ignores_bookkeeping_extras() {
        let (mut storage, id) = storage_with_source();
        let mut post = listing("https://t.me/gojobs/2026", "Go developer");
        post.extras.insert("message_id".to_string(), json!(2026));
        post.extras
            .insert("date".to_string(), json!("2026-10-10T12:00:00+00:00"));
        storage.persist_listings(id, &[post]).unwrap();

        assert_eq!(storage.backfill_salary().unwrap(), 0);
    }

    #[test]
    fn test_source_stats() {
        let (mut storage, id) = storage_with_source();
        storage
            .seed_source(&SourceEntry::channel(
                "@golangjob",
                "https://t.me/golangjob",
                Category::Job,
            ))
            .unwrap();
        storage
            .persist_listings(id, &[listing("https://x/1", "A"), listing("https://x/2", "B")])
            .unwrap();
        let first = storage.next_unpublished().unwrap().unwrap();
        storage.mark_published(first.id).unwrap();

        let stats = storage.source_stats().unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].name, "RemoteOK");
        assert_eq!(stats[0].total, 2);
        assert_eq!(stats[0].unpublished, 1);
        assert!(stats[0].last_crawled.is_some());
        assert_eq!(stats[1].kind, SourceKind::Channel);
        assert_eq!(stats[1].total, 0);
        assert!(stats[1].last_crawled.is_none());
    }
}
