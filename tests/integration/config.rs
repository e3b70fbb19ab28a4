//! Configuration files driving storage setup

use remotebridge::config::{apply_env_overrides, load_config_with_hash};
use remotebridge::model::SourceKind;
use remotebridge::output::load_statistics;
use remotebridge::storage::{SqliteStorage, Storage};
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_config_file_seeds_database() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("data").join("relay.db");
    let config_path = dir.path().join("remotebridge.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[storage]
database-path = "{}"

[[source]]
name = "Remotive"
url = "https://remotive.com"
kind = "website"
category = "job"
adapter = "remotive"

[[source]]
name = "@golangjob"
url = "https://t.me/golangjob"
kind = "channel"
category = "job"

[[source]]
name = "Paused board"
url = "https://paused.example"
kind = "website"
category = "project"
active = false
"#,
            db_path.display()
        ),
    )
    .unwrap();

    let (config, hash) = load_config_with_hash(&config_path).unwrap();
    assert_eq!(hash.len(), 64);
    assert_eq!(config.effective_sources().len(), 3);

    let mut storage = SqliteStorage::new(Path::new(&config.storage.database_path)).unwrap();
    for entry in config.effective_sources() {
        storage.seed_source(&entry).unwrap();
    }
    assert!(db_path.exists());

    assert_eq!(
        storage
            .list_active_sources(SourceKind::Website)
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        storage
            .list_active_sources(SourceKind::Channel)
            .unwrap()
            .len(),
        1
    );

    let stats = load_statistics(&storage).unwrap();
    assert_eq!(stats.sources.len(), 3);
    assert_eq!(stats.total_listings, 0);
}

#[test]
fn test_env_overrides_layer_over_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("remotebridge.toml");
    std::fs::write(&config_path, "[scheduler]\ncrawl-interval-secs = 300\n").unwrap();

    let (mut config, _) = load_config_with_hash(&config_path).unwrap();
    let env: HashMap<&str, &str> = [
        ("CRAWL_INTERVAL_SECONDS", "45"),
        ("SCRAPER_RETRIES", "5"),
        ("TARGET_CHANNEL", "@remote_feed"),
        ("BOT_TOKEN", "123:abc"),
    ]
    .into_iter()
    .collect();
    apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string())).unwrap();

    assert_eq!(config.scheduler.crawl_interval_secs, 45);
    assert_eq!(config.fetcher.max_attempts, 5);
    assert!(config.publisher.is_enabled());
}
