use crate::config::types::Config;
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are applied before validation, so a variable such
/// as `SCRAPER_RETRIES=0` is rejected the same way a bad file value is.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use remotebridge::config::load_config;
///
/// let config = load_config(Path::new("remotebridge.toml")).unwrap();
/// println!("Crawl every {}s", config.scheduler.crawl_interval_secs);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;

    Ok(config)
}

/// Builds a configuration from defaults and the environment only
pub fn config_from_env() -> ConfigResult<Config> {
    let mut config = Config::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a run can be matched to the file that drove it.
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Overlays environment variables on top of a parsed configuration
///
/// `lookup` is usually `std::env::var(..).ok()`; tests pass a map instead.
/// Blank values are ignored, malformed numbers are a validation error.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    override_parsed(&get, "SCRAPER_TIMEOUT", &mut config.fetcher.timeout_secs)?;
    override_parsed(&get, "SCRAPER_RETRIES", &mut config.fetcher.max_attempts)?;
    override_parsed(&get, "SCRAPER_SLEEP_BASE", &mut config.fetcher.backoff_base_secs)?;
    override_parsed(&get, "SCRAPER_MIN_LEN", &mut config.fetcher.min_body_len)?;

    if let Some(value) = get("DISABLE_CHALLENGE_FALLBACK") {
        config.fetcher.disable_challenge_fallback = parse_flag(&value);
    }
    if let Some(value) = get("CHALLENGE_SOLVER_URL") {
        config.fetcher.challenge_solver_url = Some(value);
    }

    override_parsed(
        &get,
        "CRAWL_INTERVAL_SECONDS",
        &mut config.scheduler.crawl_interval_secs,
    )?;
    override_parsed(
        &get,
        "CHANNEL_LOOKBACK_DAYS",
        &mut config.scheduler.channel_lookback_days,
    )?;
    override_parsed(
        &get,
        "CHANNEL_FETCH_LIMIT",
        &mut config.scheduler.channel_fetch_limit,
    )?;
    override_parsed(&get, "POST_INTERVAL_SECONDS", &mut config.publisher.interval_secs)?;

    if let Some(value) = get("BOT_TOKEN") {
        config.publisher.bot_token = value;
    }
    if let Some(value) = get("TARGET_CHANNEL") {
        config.publisher.target_channel = value;
    }
    if let Some(value) = get("DATABASE_PATH") {
        config.storage.database_path = value;
    }

    Ok(())
}

fn override_parsed<T, G>(get: &G, key: &str, slot: &mut T) -> ConfigResult<()>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    if let Some(raw) = get(key) {
        *slot = raw.parse::<T>().map_err(|_| {
            ConfigError::Validation(format!("{} must be a number, got {:?}", key, raw))
        })?;
    }
    Ok(())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
