//! Smaller HTML job boards: Remote.co, JustRemote and Wellfound

use crate::adapters::html::{attr, child_text, child_texts, listing_selector, selector, text_of};
use crate::adapters::{has_remote_signal, Adapter, SiteClient};
use crate::crawler::Fetcher;
use crate::model::{Category, RawItem};
use crate::AdapterError;
use async_trait::async_trait;
use scraper::Html;
use serde_json::Map;

macro_rules! board {
    ($name:ident, $id:literal, $base:literal, $path:literal) => {
        pub struct $name {
            site: SiteClient,
        }

        impl $name {
            pub const ID: &'static str = $id;
            pub const BASE: &'static str = $base;
            const PATH: &'static str = $path;

            pub fn new(fetcher: Fetcher) -> Self {
                Self::with_base(fetcher, Self::BASE)
            }

            pub fn with_base(fetcher: Fetcher, base: &str) -> Self {
                Self {
                    site: SiteClient::new(fetcher, base),
                }
            }
        }

        #[async_trait]
        impl Adapter for $name {
            fn id(&self) -> &str {
                Self::ID
            }

            async fn fetch_raw_items(&self) -> Result<Vec<RawItem>, AdapterError> {
                let html = self.site.get_text(Self::PATH).await?;
                self.parse(&html)
            }
        }
    };
}

board!(RemoteCo, "remoteco", "https://remote.co", "/remote-jobs/");
board!(JustRemote, "justremote", "https://justremote.co", "/remote-jobs");
board!(
    Wellfound,
    "wellfound",
    "https://wellfound.com",
    "/role/software-engineer?remote=true"
);

impl RemoteCo {
    pub fn parse(&self, html: &str) -> Result<Vec<RawItem>, AdapterError> {
        let document = Html::parse_document(html);
        let cards = listing_selector(Self::ID, "div.card")?;
        let Some(title_link) = selector("a.card-title") else {
            return Ok(Vec::new());
        };

        let mut items = Vec::new();
        for card in document.select(&cards) {
            let Some(anchor) = card.select(&title_link).next() else {
                continue;
            };
            let title = text_of(anchor);
            let Some(link) = self.site.resolve(&attr(anchor, "href")) else {
                continue;
            };
            let location = child_text(card, ".card-location");
            if !has_remote_signal(&[title.as_str()], "remote") {
                continue;
            }

            items.push(
                RawItem::new(title, link)
                    .description(location.clone())
                    .category(Category::Job)
                    .company(child_text(card, ".card-company"))
                    .location(location)
                    .extras(Map::new()),
            );
        }
        Ok(items)
    }
}

impl JustRemote {
    pub fn parse(&self, html: &str) -> Result<Vec<RawItem>, AdapterError> {
        let document = Html::parse_document(html);
        let cards = listing_selector(Self::ID, "a.job-card")?;

        let mut items = Vec::new();
        for card in document.select(&cards) {
            let title = child_text(card, ".job-title");
            let Some(link) = self.site.resolve(&attr(card, "href")) else {
                continue;
            };
            let location = child_text(card, ".job-location");
            let tags = child_texts(card, ".job-tag");
            if !has_remote_signal(&[title.as_str()], "remote") {
                continue;
            }

            let description = if tags.is_empty() {
                location.clone()
            } else {
                tags.join(" ")
            };

            items.push(
                RawItem::new(title, link)
                    .description(description)
                    .category(Category::Job)
                    .company(child_text(card, ".company"))
                    .location(location)
                    .tags(tags)
                    .extras(Map::new()),
            );
        }
        Ok(items)
    }
}

impl Wellfound {
    pub fn parse(&self, html: &str) -> Result<Vec<RawItem>, AdapterError> {
        let document = Html::parse_document(html);
        let links = listing_selector(Self::ID, "[data-test='job-listing-card'] a[href*='/jobs/']")?;

        let items = document
            .select(&links)
            .filter_map(|anchor| {
                let link = self.site.resolve(&attr(anchor, "href"))?;
                Some(
                    RawItem::new(text_of(anchor), link)
                        .description("Wellfound listing (remote)")
                        .category(Category::Job)
                        .company("")
                        .location("Remote")
                        .extras(Map::new()),
                )
            })
            .collect();
        Ok(items)
    }
}
