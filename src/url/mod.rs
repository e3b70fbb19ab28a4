//! URL helpers for adapters, the fetcher and the channel reader
//!
//! - `origin_referer`: the `Referer` value the fetcher sends with each request
//! - `resolve_link`: absolute links from scraped `href`s
//! - `channel_username`: the public username behind a channel URL

mod channel;
mod origin;
mod resolve;

pub use channel::{channel_username, message_link};
pub use origin::origin_referer;
pub use resolve::resolve_link;
