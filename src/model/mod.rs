//! Domain types shared by every stage of the pipeline
//!
//! - `SourceKind`, `Category`, `PayPeriod`: closed vocabularies stored as text
//! - `RawItem`: what an adapter produces, before validation
//! - `Listing`: the normalized record handed to persistence
//! - `CrawlStage`, `PublishStage`: states of the crawl and publish loops

mod item;
mod kinds;
mod stage;

pub use item::{Extras, Listing, RawItem};
pub use kinds::{period_to_db, Category, PayPeriod, SourceKind};
pub use stage::{CrawlStage, PublishStage};
