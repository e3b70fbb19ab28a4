//! Source adapters
//!
//! Each adapter turns one website's payload into raw items. Adapters are
//! independently fallible: the registry runs them in their own task so a
//! panic or error stays scoped to that source.
//!
//! - `remoteok`, `remotive`: JSON APIs
//! - `weworkremotely`, `remoteco`, `justremote`, `wellfound`, `devpost`: HTML
//! - `weworkremotely-rss`: RSS feed
//! - `kaggle`, `gitcoin`: placeholders without a parser yet

mod boards;
mod devpost;
mod html;
mod placeholder;
mod remoteok;
mod remotive;
mod rss;
mod weworkremotely;

pub use boards::{JustRemote, RemoteCo, Wellfound};
pub use devpost::Devpost;
pub use placeholder::Placeholder;
pub use remoteok::RemoteOk;
pub use remotive::Remotive;
pub use rss::{parse_rss, FeedEntry};
pub use weworkremotely::{WeWorkRemotely, WeWorkRemotelyRss};

use crate::crawler::{FetchOptions, Fetcher};
use crate::model::RawItem;
use crate::text::is_remote;
use crate::url::resolve_link;
use crate::{AdapterError, FetchError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Every adapter id a source may name
pub const KNOWN_ADAPTERS: &[&str] = &[
    RemoteOk::ID,
    Remotive::ID,
    WeWorkRemotely::ID,
    WeWorkRemotelyRss::ID,
    RemoteCo::ID,
    JustRemote::ID,
    Wellfound::ID,
    Devpost::ID,
    "kaggle",
    "gitcoin",
];

/// Converts one source's payload into raw items
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Registry id, as named by `adapter = "..."` on a source
    fn id(&self) -> &str;

    async fn fetch_raw_items(&self) -> Result<Vec<RawItem>, AdapterError>;
}

/// Maps adapter ids to implementations
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: BTreeMap<String, Arc<dyn Adapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every shipped adapter pointed at its live site
    pub fn with_defaults(fetcher: &Fetcher) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(RemoteOk::new(fetcher.clone())));
        registry.register(Arc::new(Remotive::new(fetcher.clone())));
        registry.register(Arc::new(WeWorkRemotely::new(fetcher.clone())));
        registry.register(Arc::new(WeWorkRemotelyRss::new(fetcher.clone())));
        registry.register(Arc::new(RemoteCo::new(fetcher.clone())));
        registry.register(Arc::new(JustRemote::new(fetcher.clone())));
        registry.register(Arc::new(Wellfound::new(fetcher.clone())));
        registry.register(Arc::new(Devpost::new(fetcher.clone())));
        registry.register(Arc::new(Placeholder::new("kaggle")));
        registry.register(Arc::new(Placeholder::new("gitcoin")));
        registry
    }

    /// Adds or replaces the adapter under its own id
    pub fn register(&mut self, adapter: Arc<dyn Adapter>) {
        self.adapters.insert(adapter.id().to_string(), adapter);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Adapter>> {
        self.adapters.get(id).cloned()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.adapters.keys().map(String::as_str).collect()
    }

    /// Runs an adapter by id with panic isolation
    pub async fn run(&self, id: &str) -> Result<Vec<RawItem>, AdapterError> {
        let adapter = self
            .get(id)
            .ok_or_else(|| AdapterError::Unknown(id.to_string()))?;
        run_isolated(adapter).await
    }
}

struct AbortOnDrop(tokio::task::AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Runs an adapter in its own task, turning a panic into `AdapterError`
///
/// Dropping the returned future aborts the task.
pub async fn run_isolated(adapter: Arc<dyn Adapter>) -> Result<Vec<RawItem>, AdapterError> {
    let id = adapter.id().to_string();
    let handle = tokio::spawn(async move { adapter.fetch_raw_items().await });
    let _guard = AbortOnDrop(handle.abort_handle());

    match handle.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => {
            let payload = e.into_panic();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(AdapterError::Panicked {
                adapter: id,
                message,
            })
        }
        Err(e) => Err(AdapterError::Panicked {
            adapter: id,
            message: e.to_string(),
        }),
    }
}

/// A site's fetcher plus the origin its paths and links resolve against
#[derive(Clone)]
pub struct SiteClient {
    fetcher: Fetcher,
    base: String,
}

impl SiteClient {
    pub fn new(fetcher: Fetcher, base: &str) -> Self {
        Self {
            fetcher,
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Absolute link for an href found on this site
    pub fn resolve(&self, href: &str) -> Option<String> {
        resolve_link(&format!("{}/", self.base), href)
    }

    pub async fn get_text(&self, path: &str) -> Result<String, FetchError> {
        self.fetcher
            .fetch(&self.url(path), &FetchOptions::default())
            .await
    }

    pub async fn get_json(&self, path: &str) -> Result<serde_json::Value, FetchError> {
        self.fetcher
            .fetch_json(&self.url(path), &FetchOptions::default())
            .await
    }
}

/// The job boards' remote filter: listing text plus the board's own marker
pub(crate) fn has_remote_signal(parts: &[&str], marker: &str) -> bool {
    is_remote(&format!("{} {}", parts.join(" "), marker))
}
