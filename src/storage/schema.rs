//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Remotebridge
//! database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Configured origins (websites and channels)
CREATE TABLE IF NOT EXISTS sources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    url TEXT NOT NULL DEFAULT '',
    kind TEXT NOT NULL,
    category TEXT NOT NULL,
    adapter TEXT NOT NULL DEFAULT '',
    active INTEGER NOT NULL DEFAULT 1,
    last_crawled TEXT
);

CREATE INDEX IF NOT EXISTS idx_sources_kind_active ON sources(kind, active);

-- Normalized listings; (source_id, link) is the dedup key
CREATE TABLE IF NOT EXISTS listings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id INTEGER NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    link TEXT NOT NULL,
    category TEXT NOT NULL,
    company TEXT NOT NULL DEFAULT '',
    location TEXT NOT NULL DEFAULT '',
    salary_min REAL,
    salary_max REAL,
    currency TEXT NOT NULL DEFAULT '',
    period TEXT NOT NULL DEFAULT '',
    tags TEXT NOT NULL DEFAULT '[]',
    extras TEXT NOT NULL DEFAULT '{}',
    raw_text TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    published INTEGER NOT NULL DEFAULT 0,
    UNIQUE(source_id, link)
);

CREATE INDEX IF NOT EXISTS idx_listings_published_created ON listings(published, created_at);
CREATE INDEX IF NOT EXISTS idx_listings_source ON listings(source_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - SQLite connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_tables_and_indexes_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for (kind, name) in [
            ("table", "sources"),
            ("table", "listings"),
            ("index", "idx_listings_published_created"),
        ] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1 AND name = ?2",
                    [kind, name],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "{} {} should exist", kind, name);
        }
    }

    #[test]
    fn test_duplicate_link_rejected_per_source() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO sources (name, kind, category) VALUES ('a', 'WEBSITE', 'JOB')",
            [],
        )
        .unwrap();

        let insert = "INSERT INTO listings (source_id, title, link, category, created_at)
                      VALUES (1, 't', 'https://x/1', 'JOB', '2024-01-01T00:00:00Z')";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());
    }
}
