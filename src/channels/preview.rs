use crate::channels::{ChannelMessage, ChannelReader};
use crate::crawler::{FetchOptions, Fetcher};
use crate::text::clean_text;
use crate::ChannelError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::{Html, Selector};

/// Reads channels through the public `t.me/s/<name>` web preview
///
/// The preview needs no credentials, serves about twenty messages per page
/// and pages backwards with `?before=<id>`.
#[derive(Clone)]
pub struct TelegramPreview {
    fetcher: Fetcher,
    base: String,
}

impl TelegramPreview {
    pub const BASE: &'static str = "https://t.me";

    pub fn new(fetcher: Fetcher, base: &str) -> Self {
        Self {
            fetcher,
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn page_url(&self, username: &str, before: Option<i64>) -> String {
        match before {
            Some(id) => format!("{}/s/{}?before={}", self.base, username, id),
            None => format!("{}/s/{}", self.base, username),
        }
    }
}

#[async_trait]
impl ChannelReader for TelegramPreview {
    async fn fetch_page(
        &self,
        username: &str,
        before: Option<i64>,
    ) -> Result<Vec<ChannelMessage>, ChannelError> {
        let url = self.page_url(username, before);
        let body = self.fetcher.fetch(&url, &FetchOptions::default()).await?;
        Ok(parse_preview_page(&body))
    }
}

/// Extracts the messages of one preview page, in page order
pub fn parse_preview_page(html: &str) -> Vec<ChannelMessage> {
    let document = Html::parse_document(html);

    let (Ok(message_sel), Ok(text_sel), Ok(time_sel), Ok(views_sel)) = (
        Selector::parse("div.tgme_widget_message[data-post]"),
        Selector::parse(".tgme_widget_message_text"),
        Selector::parse("time[datetime]"),
        Selector::parse(".tgme_widget_message_views"),
    ) else {
        return Vec::new();
    };

    let mut messages = Vec::new();
    for element in document.select(&message_sel) {
        let Some(id) = element
            .value()
            .attr("data-post")
            .and_then(|post| post.rsplit('/').next())
            .and_then(|id| id.parse::<i64>().ok())
        else {
            continue;
        };

        let text = element
            .select(&text_sel)
            .next()
            .map(|t| clean_text(&t.inner_html()))
            .unwrap_or_default();

        let date = element
            .select(&time_sel)
            .next()
            .and_then(|t| t.value().attr("datetime"))
            .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
            .map(|d| d.with_timezone(&Utc));

        let views = element
            .select(&views_sel)
            .next()
            .map(|v| v.text().collect::<String>().trim().to_string())
            .filter(|v| !v.is_empty());

        let service = element.value().classes().any(|c| c == "service_message");

        messages.push(ChannelMessage {
            id,
            date,
            text,
            views,
            service,
        });
    }
    messages
}
