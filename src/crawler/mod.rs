//! Crawler module for source fetching and ingestion
//!
//! This module contains the core ingestion logic, including:
//! - HTTP fetching with retry, backoff and block-page detection
//! - Raw item validation and salary enrichment
//! - Per-source crawl coordination with failure isolation
//! - The recurring website and channel loops

mod coordinator;
mod fetcher;
mod normalizer;
mod scheduler;

pub use coordinator::{Coordinator, TickSummary};
pub use fetcher::{
    looks_like_blockpage, parse_json_lenient, ChallengeSolver, FetchOptions, FetchReport,
    Fetcher, FlareSolverr, SolvedPage, DEFAULT_USER_AGENTS, RETRY_STATUS,
};
pub use normalizer::{normalize, normalize_item, salary_text};
pub use scheduler::{channel_loop, run_every, website_loop};
