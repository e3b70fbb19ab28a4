//! Remotebridge main entry point
//!
//! This is the command-line interface for the remote-work listing relay.

use anyhow::{bail, Context};
use clap::Parser;
use remotebridge::adapters::AdapterRegistry;
use remotebridge::channels::TelegramPreview;
use remotebridge::config::{config_from_env, load_config_with_hash, validate, Config, SourceEntry};
use remotebridge::crawler::{channel_loop, website_loop, Coordinator, Fetcher};
use remotebridge::model::{Category, SourceKind};
use remotebridge::output::{format_sample, load_statistics, print_statistics};
use remotebridge::publish::{Publisher, TelegramMessenger};
use remotebridge::storage::{SharedStorage, SqliteStorage, Storage};
use remotebridge::url::channel_username;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Remotebridge: a remote-work listing relay
///
/// Remotebridge polls job boards and public channels for remote
/// opportunities, stores them without duplicates, and posts them one at a
/// time to a messaging channel.
#[derive(Parser, Debug)]
#[command(name = "remotebridge")]
#[command(version)]
#[command(about = "A remote-work listing relay", long_about = None)]
struct Cli {
    /// Path to TOML configuration file; the environment alone is used when omitted
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would run without starting any loop
    #[arg(long, conflicts_with_all = ["stats", "once", "backfill_salary", "add_channel"])]
    dry_run: bool,

    /// Show per-source statistics from the database and exit
    #[arg(long, conflicts_with_all = ["once", "backfill_salary", "add_channel"])]
    stats: bool,

    /// Run a single website crawl pass and print sampled listings
    #[arg(long, conflicts_with_all = ["backfill_salary", "add_channel"])]
    once: bool,

    /// Restrict --once to the named source (repeatable)
    #[arg(long = "source", value_name = "NAME", requires = "once")]
    sources: Vec<String>,

    /// With --once, print listings without storing them
    #[arg(long, requires = "once")]
    no_persist: bool,

    /// Re-parse salaries of stored listings that have none and exit
    #[arg(long, conflicts_with = "add_channel")]
    backfill_salary: bool,

    /// Add channel sources by URL or @name and exit
    #[arg(long, value_name = "URL", num_args = 1..)]
    add_channel: Vec<String>,

    /// Category for channels added with --add-channel
    #[arg(long, value_parser = parse_category, default_value = "job", requires = "add_channel")]
    category: Category,
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::from_db_string(s).ok_or_else(|| format!("unknown category {s:?}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No config file given, using defaults and environment");
            config_from_env().context("invalid environment configuration")?
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.backfill_salary {
        handle_backfill(&config)?;
    } else if !cli.add_channel.is_empty() {
        handle_add_channels(&config, &cli.add_channel, cli.category)?;
    } else if cli.once {
        handle_once(&config, &cli.sources, cli.no_persist).await?;
    } else {
        handle_run(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("remotebridge=info,warn"),
            1 => EnvFilter::new("remotebridge=debug,info"),
            2 => EnvFilter::new("remotebridge=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_shared(config: &Config) -> anyhow::Result<SharedStorage> {
    let path = Path::new(&config.storage.database_path);
    let storage = SqliteStorage::new(path)
        .with_context(|| format!("failed to open database {}", path.display()))?;
    Ok(SharedStorage::new(storage))
}

fn build_coordinator(config: &Config, storage: SharedStorage) -> anyhow::Result<Coordinator> {
    let fetcher = Fetcher::new(&config.fetcher).context("failed to build HTTP client")?;
    let registry = AdapterRegistry::with_defaults(&fetcher);
    let reader = Arc::new(TelegramPreview::new(
        fetcher,
        &config.scheduler.channel_preview_base,
    ));
    Ok(Coordinator::new(storage, registry, reader, &config.scheduler))
}

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &Config) {
    println!("=== Remotebridge Dry Run ===\n");

    println!("Fetcher:");
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  Attempts: {}", config.fetcher.max_attempts);
    println!("  Backoff base: {}s", config.fetcher.backoff_base_secs);
    println!("  Minimum body length: {}", config.fetcher.min_body_len);
    println!(
        "  Challenge solver: {}",
        match (&config.fetcher.challenge_solver_url, config.fetcher.disable_challenge_fallback) {
            (_, true) => "disabled".to_string(),
            (Some(url), false) => url.clone(),
            (None, false) => "not configured".to_string(),
        }
    );

    println!("\nScheduler:");
    println!("  Crawl interval: {}s", config.scheduler.crawl_interval_secs);
    println!("  Channel lookback: {} days", config.scheduler.channel_lookback_days);
    println!("  Channel fetch limit: {}", config.scheduler.channel_fetch_limit);

    println!("\nPublisher:");
    println!("  Interval: {}s", config.publisher.interval_secs);
    if config.publisher.is_enabled() {
        println!("  Target: {}", config.publisher.target_channel);
    } else {
        println!("  Disabled (bot token or target channel missing)");
    }

    println!("\nDatabase: {}", config.storage.database_path);

    let sources = config.effective_sources();
    let websites: Vec<&SourceEntry> = sources
        .iter()
        .filter(|s| s.kind == SourceKind::Website)
        .collect();
    let channels: Vec<&SourceEntry> = sources
        .iter()
        .filter(|s| s.kind == SourceKind::Channel)
        .collect();

    println!("\nWebsites ({}):", websites.len());
    for source in &websites {
        let adapter = if source.adapter.is_empty() {
            "no adapter"
        } else {
            source.adapter.as_str()
        };
        println!("  - {} [{}] ({})", source.name, source.category, adapter);
    }

    println!("\nChannels ({}):", channels.len());
    for source in &channels {
        println!("  - {} [{}]", source.name, source.category);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows per-source status from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.storage.database_path);
    let storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);
    Ok(())
}

/// Handles the --backfill-salary mode
fn handle_backfill(config: &Config) -> anyhow::Result<()> {
    let mut storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;
    let updated = storage.backfill_salary()?;
    println!("✓ Salary filled in for {} listings", updated);
    Ok(())
}

/// Handles the --add-channel mode: seeds one channel source per URL
fn handle_add_channels(config: &Config, urls: &[String], category: Category) -> anyhow::Result<()> {
    let mut entries = Vec::new();
    for url in urls {
        let Some(username) = channel_username(url) else {
            bail!("cannot derive a channel username from {url:?}");
        };
        entries.push(SourceEntry::channel(
            &format!("@{username}"),
            &format!("https://t.me/{username}"),
            category,
        ));
    }

    let mut candidate = config.clone();
    candidate.sources.extend(entries.iter().cloned());
    validate(&candidate)?;

    let mut storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;
    for entry in &entries {
        storage.seed_source(entry)?;
        println!("✓ Added {} ({})", entry.name, entry.category);
    }
    Ok(())
}

/// Handles the --once mode: one website pass with sampled output
async fn handle_once(config: &Config, only: &[String], no_persist: bool) -> anyhow::Result<()> {
    let storage = open_shared(config)?;
    let coordinator = build_coordinator(config, storage.clone())?;
    coordinator.seed_sources(&config.effective_sources())?;

    let sources = {
        let storage = storage.lock()?;
        storage.list_active_sources(SourceKind::Website)?
    };
    let selected: Vec<_> = sources
        .into_iter()
        .filter(|s| !s.adapter.is_empty())
        .filter(|s| only.is_empty() || only.iter().any(|name| name == &s.name))
        .collect();
    if selected.is_empty() {
        bail!("no active website source matches the selection");
    }

    for source in &selected {
        match coordinator.fetch_source_listings(source).await {
            Ok(listings) => {
                print!("{}", format_sample(&source.name, &listings, 5));
                if !no_persist {
                    match coordinator.persist(source, &listings) {
                        Ok(new) => println!("  stored, {} new", new),
                        Err(e) => println!("  store failed: {}", e),
                    }
                }
            }
            Err(e) => println!("{}: failed: {}", source.name, e),
        }
    }
    Ok(())
}

/// Handles the default mode: crawl loops and publisher until Ctrl-C
async fn handle_run(config: Config) -> anyhow::Result<()> {
    let storage = open_shared(&config)?;
    let coordinator = Arc::new(build_coordinator(&config, storage.clone())?);
    coordinator.seed_sources(&config.effective_sources())?;

    let cancel = CancellationToken::new();
    let crawl_every = Duration::from_secs(config.scheduler.crawl_interval_secs);
    let mut tasks = vec![
        tokio::spawn(website_loop(
            Arc::clone(&coordinator),
            crawl_every,
            cancel.clone(),
        )),
        tokio::spawn(channel_loop(
            Arc::clone(&coordinator),
            crawl_every,
            cancel.clone(),
        )),
    ];

    if config.publisher.is_enabled() {
        let messenger = Arc::new(TelegramMessenger::from_config(&config.publisher)?);
        let publisher = Arc::new(Publisher::new(
            storage.clone(),
            messenger.clone(),
            &config.publisher.target_channel,
        ));
        tasks.push(tokio::spawn(publisher.run(
            Duration::from_secs(config.publisher.interval_secs),
            cancel.clone(),
        )));

        if config.publisher.respond_to_ping {
            let token = cancel.clone();
            tasks.push(tokio::spawn(async move {
                messenger.respond_to_ping(token).await;
            }));
        }
    } else {
        tracing::warn!("Publisher disabled: BOT_TOKEN or TARGET_CHANNEL is not set");
    }

    tracing::info!("Running; press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    tracing::info!("Shutdown requested");
    cancel.cancel();

    for task in tasks {
        if let Err(e) = task.await {
            tracing::error!("Task ended abnormally: {}", e);
        }
    }
    tracing::info!("Stopped");
    Ok(())
}
