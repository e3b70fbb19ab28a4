use crate::adapters::html::{attr, child_text, child_texts, listing_selector, selector};
use crate::adapters::{has_remote_signal, parse_rss, Adapter, SiteClient};
use crate::crawler::Fetcher;
use crate::model::{Category, RawItem};
use crate::text::clean_text;
use crate::AdapterError;
use async_trait::async_trait;
use scraper::Html;
use serde_json::{json, Map};

/// We Work Remotely job list page
pub struct WeWorkRemotely {
    site: SiteClient,
}

impl WeWorkRemotely {
    pub const ID: &'static str = "weworkremotely";
    pub const BASE: &'static str = "https://weworkremotely.com";

    pub fn new(fetcher: Fetcher) -> Self {
        Self::with_base(fetcher, Self::BASE)
    }

    pub fn with_base(fetcher: Fetcher, base: &str) -> Self {
        Self {
            site: SiteClient::new(fetcher, base),
        }
    }

    /// Featured listings from the `section.jobs` blocks
    pub fn parse(&self, html: &str) -> Result<Vec<RawItem>, AdapterError> {
        let document = Html::parse_document(html);
        let rows = listing_selector(Self::ID, "section.jobs li.feature")?;
        let Some(anchor) = selector("a[href]") else {
            return Ok(Vec::new());
        };

        let mut items = Vec::new();
        for li in document.select(&rows) {
            let Some(link) = li
                .select(&anchor)
                .next()
                .and_then(|a| self.site.resolve(&attr(a, "href")))
            else {
                continue;
            };

            let company = child_text(li, "span.company");
            let title = child_text(li, "span.title");
            let region = child_text(li, "span.region");
            if !has_remote_signal(&[company.as_str(), title.as_str()], "remote") {
                continue;
            }

            let mut extras = Map::new();
            extras.insert("region".to_string(), json!(region));

            items.push(
                RawItem::new(title, link)
                    .description(region.clone())
                    .category(Category::Job)
                    .company(company)
                    .location(region)
                    .tags(child_texts(li, "span.feature"))
                    .extras(extras),
            );
        }
        Ok(items)
    }
}

#[async_trait]
impl Adapter for WeWorkRemotely {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn fetch_raw_items(&self) -> Result<Vec<RawItem>, AdapterError> {
        let html = self.site.get_text("/remote-jobs").await?;
        self.parse(&html)
    }
}

/// We Work Remotely RSS feed; titles read `Company: Role`
pub struct WeWorkRemotelyRss {
    site: SiteClient,
}

impl WeWorkRemotelyRss {
    pub const ID: &'static str = "weworkremotely-rss";

    pub fn new(fetcher: Fetcher) -> Self {
        Self::with_base(fetcher, WeWorkRemotely::BASE)
    }

    pub fn with_base(fetcher: Fetcher, base: &str) -> Self {
        Self {
            site: SiteClient::new(fetcher, base),
        }
    }
}

/// Converts feed entries, splitting the company off the title
pub fn parse_wwr_feed(xml: &str) -> Result<Vec<RawItem>, AdapterError> {
    let items = parse_rss(xml)?
        .into_iter()
        .map(|entry| {
            let (company, title) = match entry.title.split_once(": ") {
                Some((company, title)) if !title.trim().is_empty() => {
                    (company.trim().to_string(), title.trim().to_string())
                }
                _ => (String::new(), entry.title.clone()),
            };

            let mut extras = Map::new();
            extras.insert("published".to_string(), json!(entry.published));

            RawItem::new(title, entry.link)
                .description(clean_text(&entry.description))
                .category(Category::Job)
                .company(company)
                .extras(extras)
        })
        .collect();
    Ok(items)
}

#[async_trait]
impl Adapter for WeWorkRemotelyRss {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn fetch_raw_items(&self) -> Result<Vec<RawItem>, AdapterError> {
        let xml = self.site.get_text("/remote-jobs.rss").await?;
        parse_wwr_feed(&xml)
    }
}
