use crate::model::{Category, SourceKind};
use serde::Deserialize;

/// Main configuration structure for Remotebridge
///
/// Every section is optional; missing keys take the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetcher: FetcherConfig,
    pub scheduler: SchedulerConfig,
    pub publisher: PublisherConfig,
    pub storage: StorageConfig,
    /// Sources to seed; the built-in catalogue is used when this is empty
    #[serde(rename = "source")]
    pub sources: Vec<SourceEntry>,
}

/// HTTP retrieval settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetcherConfig {
    /// Timeout per attempt (seconds)
    pub timeout_secs: u64,

    /// Attempts before a fetch fails
    pub max_attempts: u32,

    /// Backoff base; attempt `i` sleeps `base * 2^i` plus jitter (seconds)
    pub backoff_base_secs: f64,

    /// Upper bound of the random jitter added to each backoff (seconds)
    pub jitter_max_secs: f64,

    /// Bodies shorter than this are treated as failures (bytes)
    pub min_body_len: usize,

    /// Skips the anti-bot challenge solver even when one is configured
    pub disable_challenge_fallback: bool,

    /// FlareSolverr-compatible endpoint used as the last fallback
    pub challenge_solver_url: Option<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 25,
            max_attempts: 3,
            backoff_base_secs: 1.0,
            jitter_max_secs: 0.75,
            min_body_len: 200,
            disable_challenge_fallback: false,
            challenge_solver_url: None,
        }
    }
}

/// Crawl loop settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SchedulerConfig {
    /// Interval of both the website and the channel loop (seconds)
    pub crawl_interval_secs: u64,

    /// Channel messages older than this are not ingested (days)
    pub channel_lookback_days: u32,

    /// Maximum messages scanned per channel per tick
    pub channel_fetch_limit: usize,

    /// Base URL of the public channel preview pages
    pub channel_preview_base: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            crawl_interval_secs: 60,
            channel_lookback_days: 7,
            channel_fetch_limit: 300,
            channel_preview_base: "https://t.me".to_string(),
        }
    }
}

/// Outbound channel settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PublisherConfig {
    /// Publisher tick interval (seconds)
    pub interval_secs: u64,

    /// Bot API token; publishing is disabled when blank
    pub bot_token: String,

    /// Destination chat, e.g. `@remote_feed`
    pub target_channel: String,

    /// Bot API base URL
    pub api_base: String,

    /// Answer `/ping` with `pong` through long polling
    pub respond_to_ping: bool,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            bot_token: String::new(),
            target_channel: String::new(),
            api_base: "https://api.telegram.org".to_string(),
            respond_to_ping: false,
        }
    }
}

impl PublisherConfig {
    /// True when both a token and a destination are set
    pub fn is_enabled(&self) -> bool {
        !self.bot_token.trim().is_empty() && !self.target_channel.trim().is_empty()
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Path to the SQLite database file
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "remotebridge.db".to_string(),
        }
    }
}

/// A source to seed into the store
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceEntry {
    /// Unique display name
    pub name: String,

    /// Origin URL; for channels, the channel URL or `@username`
    #[serde(default)]
    pub url: String,

    pub kind: SourceKind,

    pub category: Category,

    /// Adapter id; empty for channels and for websites without a parser
    #[serde(default)]
    pub adapter: String,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl SourceEntry {
    pub fn website(name: &str, url: &str, category: Category, adapter: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            kind: SourceKind::Website,
            category,
            adapter: adapter.to_string(),
            active: true,
        }
    }

    pub fn channel(name: &str, url: &str, category: Category) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            kind: SourceKind::Channel,
            category,
            adapter: String::new(),
            active: true,
        }
    }
}
