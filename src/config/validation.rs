use crate::adapters::KNOWN_ADAPTERS;
use crate::config::types::{Config, FetcherConfig, PublisherConfig, SchedulerConfig, SourceEntry};
use crate::model::SourceKind;
use crate::url::channel_username;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Longest channel lookback window accepted, in days
pub const MAX_LOOKBACK_DAYS: u32 = 3650;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_scheduler_config(&config.scheduler)?;
    validate_publisher_config(&config.publisher)?;

    if config.storage.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    validate_sources(&config.sources)?;
    Ok(())
}

fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    for (name, value) in [
        ("backoff_base_secs", config.backoff_base_secs),
        ("jitter_max_secs", config.jitter_max_secs),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::Validation(format!(
                "{} must be a finite number >= 0, got {}",
                name, value
            )));
        }
    }

    if let Some(solver) = &config.challenge_solver_url {
        Url::parse(solver)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid challenge_solver_url: {}", e)))?;
    }

    Ok(())
}

fn validate_scheduler_config(config: &SchedulerConfig) -> Result<(), ConfigError> {
    if config.crawl_interval_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "crawl_interval_secs must be >= 1, got {}",
            config.crawl_interval_secs
        )));
    }

    if config.channel_lookback_days > MAX_LOOKBACK_DAYS {
        return Err(ConfigError::Validation(format!(
            "channel_lookback_days must be <= {}, got {}",
            MAX_LOOKBACK_DAYS, config.channel_lookback_days
        )));
    }

    if config.channel_fetch_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "channel_fetch_limit must be >= 1, got {}",
            config.channel_fetch_limit
        )));
    }

    Url::parse(&config.channel_preview_base)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid channel_preview_base: {}", e)))?;

    Ok(())
}

fn validate_publisher_config(config: &PublisherConfig) -> Result<(), ConfigError> {
    if config.interval_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "publisher interval_secs must be >= 1, got {}",
            config.interval_secs
        )));
    }

    Url::parse(&config.api_base)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api_base: {}", e)))?;

    Ok(())
}

fn validate_sources(sources: &[SourceEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for source in sources {
        let name = source.name.trim();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "source name cannot be empty".to_string(),
            ));
        }
        if !seen.insert(name.to_string()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate source name: {}",
                name
            )));
        }

        match source.kind {
            SourceKind::Website => {
                if !source.adapter.is_empty() && !KNOWN_ADAPTERS.contains(&source.adapter.as_str())
                {
                    return Err(ConfigError::Validation(format!(
                        "Source '{}' names unknown adapter '{}'",
                        name, source.adapter
                    )));
                }
                if !source.url.is_empty() {
                    Url::parse(&source.url).map_err(|e| {
                        ConfigError::InvalidUrl(format!("Source '{}': {}", name, e))
                    })?;
                }
            }
            SourceKind::Channel => {
                let origin = if source.url.is_empty() {
                    &source.name
                } else {
                    &source.url
                };
                if channel_username(origin).is_none() {
                    return Err(ConfigError::Validation(format!(
                        "Cannot derive a channel username for source '{}'",
                        name
                    )));
                }
            }
        }
    }

    Ok(())
}
