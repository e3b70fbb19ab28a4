use crate::adapters::html::{attr, child_text, listing_selector, selector, text_of};
use crate::adapters::{has_remote_signal, Adapter, SiteClient};
use crate::crawler::Fetcher;
use crate::model::{Category, RawItem};
use crate::AdapterError;
use async_trait::async_trait;
use scraper::Html;
use serde_json::{json, Map};

/// Words that mark a hackathon as joinable from anywhere
const ONLINE_MARKER: &str = "online virtual global remote anywhere";

/// Devpost upcoming hackathons, published as projects
pub struct Devpost {
    site: SiteClient,
}

impl Devpost {
    pub const ID: &'static str = "devpost";
    pub const BASE: &'static str = "https://devpost.com";

    pub fn new(fetcher: Fetcher) -> Self {
        Self::with_base(fetcher, Self::BASE)
    }

    pub fn with_base(fetcher: Fetcher, base: &str) -> Self {
        Self {
            site: SiteClient::new(fetcher, base),
        }
    }

    pub fn parse(&self, html: &str) -> Result<Vec<RawItem>, AdapterError> {
        let document = Html::parse_document(html);
        let tiles = listing_selector(Self::ID, ".hackathon-tile")?;
        let Some(title_link) = selector("a.hackathon-tile-title") else {
            return Ok(Vec::new());
        };

        let mut items = Vec::new();
        for tile in document.select(&tiles) {
            let Some(anchor) = tile.select(&title_link).next() else {
                continue;
            };
            let title = text_of(anchor);
            let Some(link) = self.site.resolve(&attr(anchor, "href")) else {
                continue;
            };
            let info = child_text(tile, ".takeaways");
            if !has_remote_signal(&[title.as_str(), info.as_str()], ONLINE_MARKER) {
                continue;
            }

            let mut extras = Map::new();
            extras.insert("takeaways".to_string(), json!(info));

            items.push(
                RawItem::new(title, link)
                    .description(info)
                    .category(Category::Project)
                    .company("")
                    .location("Online")
                    .tags(Vec::new())
                    .extras(extras),
            );
        }
        Ok(items)
    }
}

#[async_trait]
impl Adapter for Devpost {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn fetch_raw_items(&self) -> Result<Vec<RawItem>, AdapterError> {
        let html = self
            .site
            .get_text("/hackathons?sort_by=deadline&status=upcoming&open_to=all")
            .await?;
        self.parse(&html)
    }
}
