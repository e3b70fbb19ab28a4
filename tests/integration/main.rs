//! Integration tests for remotebridge
//!
//! These tests use wiremock to stand in for job boards, channel previews
//! and the Bot API, and exercise the crawl and publish paths end-to-end.

mod adapters;
mod channels;
mod config;
mod fetcher;
mod pipeline;

use remotebridge::config::FetcherConfig;
use remotebridge::crawler::Fetcher;

/// Fetcher settings that keep retries fast and deterministic
pub fn fast_config() -> FetcherConfig {
    FetcherConfig {
        timeout_secs: 5,
        max_attempts: 3,
        backoff_base_secs: 0.01,
        jitter_max_secs: 0.0,
        min_body_len: 20,
        disable_challenge_fallback: true,
        challenge_solver_url: None,
    }
}

pub fn fast_fetcher() -> Fetcher {
    Fetcher::new(&fast_config()).expect("Failed to build fetcher")
}

/// Pads a body past the block-page size threshold
pub fn padded(body: &str) -> String {
    format!("{body}<!-- {} -->", "padding ".repeat(16))
}
