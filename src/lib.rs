//! Remotebridge: a remote-work listing relay
//!
//! This crate collects job, project and competition listings from websites
//! and public channels, normalizes them into a common record, deduplicates
//! them against a SQLite store, and republishes them one at a time to a
//! single messaging channel.

pub mod adapters;
pub mod channels;
pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod publish;
pub mod storage;
pub mod text;
pub mod url;

use thiserror::Error;

/// Main error type for Remotebridge operations
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Raised by the fetcher only after every configured attempt has failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetch({url}) failed after {attempts} attempts: status={status:?} err={last_error:?}")]
    Exhausted {
        url: String,
        attempts: u32,
        status: Option<u16>,
        last_error: Option<String>,
    },

    #[error("Response from {url} is not valid JSON: {message}")]
    Json { url: String, message: String },

    #[error("Challenge solver failed: {0}")]
    Challenge(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Failure inside one source adapter
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Unexpected payload shape from {adapter}: {message}")]
    Payload { adapter: String, message: String },

    #[error("Adapter {adapter} panicked: {message}")]
    Panicked { adapter: String, message: String },

    #[error("Unknown adapter id: {0}")]
    Unknown(String),
}

/// Failure while reading a messaging channel
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Cannot derive a channel username from {0:?}")]
    NoUsername(String),

    #[error("Lookback of {0} days reaches past the earliest representable date")]
    LookbackOutOfRange(u32),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

/// Failure while dispatching a message to the destination channel
#[derive(Debug, Error)]
pub enum SendError {
    #[error("Messenger is not configured: {0}")]
    NotConfigured(String),

    #[error("HTTP error from messaging API: {status} {body}")]
    Http { status: u16, body: String },

    #[error("Messaging API rejected the message: {0}")]
    Rejected(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Result type alias for Remotebridge operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{Category, Listing, PayPeriod, RawItem, SourceKind};
pub use text::{clean_text, derive_hashtags, is_remote, parse_salary, Salary};
