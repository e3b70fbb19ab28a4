//! Crawl coordinator - one pass over every active source of a kind
//!
//! Each tick of a crawl loop lands here:
//! - Enumerating the active sources from the store
//! - Running the source's adapter (websites) or channel scan (channels)
//! - Normalizing raw items and persisting the batch
//! - Isolating failures so one broken source never aborts the tick

use crate::adapters::AdapterRegistry;
use crate::channels::{collect_recent, message_to_item, ChannelReader};
use crate::config::{SchedulerConfig, SourceEntry};
use crate::crawler::normalizer::normalize;
use crate::model::{CrawlStage, Listing, RawItem, SourceKind};
use crate::storage::{SharedStorage, SourceRecord, Storage, StorageResult};
use crate::url::channel_username;
use crate::ChannelError;
use chrono::Utc;
use std::sync::Arc;

/// Outcome of one pass over a class of sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Sources attempted this tick
    pub sources: usize,

    /// Sources whose batch was persisted
    pub succeeded: usize,

    /// Sources skipped because some stage failed
    pub failed: usize,

    /// Listings that did not exist before this tick
    pub new_listings: usize,
}

/// Main crawl coordinator structure
pub struct Coordinator {
    storage: SharedStorage,
    registry: AdapterRegistry,
    reader: Arc<dyn ChannelReader>,
    lookback_days: u32,
    fetch_limit: usize,
}

impl Coordinator {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `storage` - The store shared with the publisher
    /// * `registry` - Adapters available to website sources
    /// * `reader` - How channel history is read
    /// * `config` - Lookback window and message cap for channel scans
    pub fn new(
        storage: SharedStorage,
        registry: AdapterRegistry,
        reader: Arc<dyn ChannelReader>,
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            storage,
            registry,
            reader,
            lookback_days: config.channel_lookback_days,
            fetch_limit: config.channel_fetch_limit,
        }
    }

    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    /// Upserts every source entry, returning how many were seeded
    pub fn seed_sources(&self, entries: &[SourceEntry]) -> StorageResult<usize> {
        let mut storage = self.storage.lock()?;
        for entry in entries {
            storage.seed_source(entry)?;
        }
        tracing::info!(count = entries.len(), "Seeded sources");
        Ok(entries.len())
    }

    /// Crawls every active website source that has an adapter
    pub async fn crawl_websites_once(&self) -> StorageResult<TickSummary> {
        let sources = {
            let storage = self.storage.lock()?;
            storage.list_active_sources(SourceKind::Website)?
        };

        let mut summary = TickSummary::default();
        for source in sources {
            if source.adapter.trim().is_empty() {
                tracing::debug!(source = %source.name, "No adapter configured, skipping");
                continue;
            }
            summary.sources += 1;
            match self.crawl_source(&source).await {
                Ok(new) => {
                    summary.succeeded += 1;
                    summary.new_listings += new;
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(source = %source.name, error = %e, "Website source failed this tick");
                }
            }
        }

        tracing::info!(
            sources = summary.sources,
            failed = summary.failed,
            new = summary.new_listings,
            "Website crawl tick finished"
        );
        Ok(summary)
    }

    /// Crawls every active channel source
    pub async fn crawl_channels_once(&self) -> StorageResult<TickSummary> {
        let sources = {
            let storage = self.storage.lock()?;
            storage.list_active_sources(SourceKind::Channel)?
        };

        let mut summary = TickSummary::default();
        for source in sources {
            summary.sources += 1;
            match self.crawl_channel(&source).await {
                Ok(new) => {
                    summary.succeeded += 1;
                    summary.new_listings += new;
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(source = %source.name, error = %e, "Channel source failed this tick");
                }
            }
        }

        tracing::info!(
            sources = summary.sources,
            failed = summary.failed,
            new = summary.new_listings,
            "Channel crawl tick finished"
        );
        Ok(summary)
    }

    /// Runs a website source's adapter and normalizes what it returns
    ///
    /// Nothing is written; `crawl_source` persists the result.
    pub async fn fetch_source_listings(
        &self,
        source: &SourceRecord,
    ) -> crate::Result<Vec<Listing>> {
        tracing::debug!(source = %source.name, stage = %CrawlStage::Fetching, adapter = %source.adapter);
        let items = self.registry.run(source.adapter.trim()).await?;

        tracing::debug!(source = %source.name, stage = %CrawlStage::Normalizing, raw = items.len());
        Ok(normalize(items, source.category))
    }

    /// Fetches, normalizes and persists one website source
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of newly created listings
    /// * `Err(RelayError)` - The stage that failed; nothing was written
    pub async fn crawl_source(&self, source: &SourceRecord) -> crate::Result<usize> {
        let listings = self.fetch_source_listings(source).await?;
        self.persist(source, &listings)
    }

    /// Scans one channel down to the lookback cutoff and persists the result
    pub async fn crawl_channel(&self, source: &SourceRecord) -> crate::Result<usize> {
        let origin = source.channel_origin();
        let username = channel_username(origin)
            .ok_or_else(|| ChannelError::NoUsername(origin.to_string()))?;
        let cutoff = Utc::now()
            .checked_sub_signed(chrono::Duration::days(i64::from(self.lookback_days)))
            .ok_or(ChannelError::LookbackOutOfRange(self.lookback_days))?;

        tracing::debug!(source = %source.name, stage = %CrawlStage::Fetching, %username);
        let messages =
            collect_recent(self.reader.as_ref(), &username, cutoff, self.fetch_limit).await?;

        tracing::debug!(source = %source.name, stage = %CrawlStage::Parsing, messages = messages.len());
        let items: Vec<RawItem> = messages
            .iter()
            .filter_map(|m| message_to_item(m, &username, source.category))
            .collect();

        tracing::debug!(source = %source.name, stage = %CrawlStage::Normalizing, raw = items.len());
        let listings = normalize(items, source.category);
        self.persist(source, &listings)
    }

    /// Persists one source's batch atomically, returning the new-row count
    pub fn persist(&self, source: &SourceRecord, listings: &[Listing]) -> crate::Result<usize> {
        tracing::debug!(source = %source.name, stage = %CrawlStage::Persisting, count = listings.len());
        let new = {
            let mut storage = self.storage.lock()?;
            storage.persist_listings(source.id, listings)?
        };
        tracing::info!(source = %source.name, total = listings.len(), new, "Persisted batch");
        Ok(new)
    }
}
