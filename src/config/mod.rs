//! Configuration module for Remotebridge
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, with environment variables layered on top.
//!
//! # Example
//!
//! ```no_run
//! use remotebridge::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("remotebridge.toml")).unwrap();
//! println!("Publishing every {}s", config.publisher.interval_secs);
//! ```

mod catalogue;
mod parser;
mod types;
mod validation;

pub use catalogue::default_sources;
pub use types::{
    Config, FetcherConfig, PublisherConfig, SchedulerConfig, SourceEntry, StorageConfig,
};

pub use parser::{
    apply_env_overrides, compute_config_hash, config_from_env, load_config, load_config_with_hash,
};
pub use validation::{validate, MAX_LOOKBACK_DAYS};

impl Config {
    /// Configured sources, or the built-in catalogue when none are listed
    pub fn effective_sources(&self) -> Vec<SourceEntry> {
        if self.sources.is_empty() {
            default_sources()
        } else {
            self.sources.clone()
        }
    }
}
