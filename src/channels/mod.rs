//! Messaging-channel ingestion
//!
//! A channel is read newest-first one page at a time. Scanning stops at the
//! first message older than the lookback cutoff or once the cap is reached.

mod preview;

pub use preview::{parse_preview_page, TelegramPreview};

use crate::model::{Category, Extras, RawItem};
use crate::url::message_link;
use crate::ChannelError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

/// Titles are the first non-empty line, clipped to this many characters
pub const MAX_TITLE_CHARS: usize = 160;

/// A message as read from a channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMessage {
    pub id: i64,
    pub date: Option<DateTime<Utc>>,
    pub text: String,
    pub views: Option<String>,
    /// Join notices, pinned-message markers and the like
    pub service: bool,
}

/// Reads one page of channel history
#[async_trait]
pub trait ChannelReader: Send + Sync {
    /// Messages older than `before` (or the latest when `None`), newest first
    async fn fetch_page(
        &self,
        username: &str,
        before: Option<i64>,
    ) -> Result<Vec<ChannelMessage>, ChannelError>;
}

/// Scans a channel newest-first down to `cutoff`, reading at most `limit` messages
///
/// Service and empty messages count toward the limit but are not returned.
pub async fn collect_recent(
    reader: &dyn ChannelReader,
    username: &str,
    cutoff: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<ChannelMessage>, ChannelError> {
    let mut collected = Vec::new();
    let mut scanned = 0usize;
    let mut before: Option<i64> = None;

    'pages: loop {
        let mut page = reader.fetch_page(username, before).await?;
        if page.is_empty() {
            break;
        }
        page.sort_by(|a, b| b.id.cmp(&a.id));

        let oldest = page.last().map(|m| m.id);
        for message in page {
            if scanned >= limit {
                break 'pages;
            }
            scanned += 1;

            if message.date.is_some_and(|date| date < cutoff) {
                tracing::debug!(username, id = message.id, "Reached lookback cutoff");
                break 'pages;
            }
            if message.service || message.text.trim().is_empty() {
                continue;
            }
            collected.push(message);
        }

        match (oldest, before) {
            (Some(oldest), Some(previous)) if oldest >= previous => break,
            (Some(oldest), _) if oldest > 1 => before = Some(oldest),
            _ => break,
        }
    }

    Ok(collected)
}

/// Converts a message into a raw item, or `None` for service/empty messages
pub fn message_to_item(
    message: &ChannelMessage,
    username: &str,
    category: Category,
) -> Option<RawItem> {
    if message.service {
        return None;
    }
    let text = message.text.trim();
    if text.is_empty() {
        return None;
    }

    let first_line = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("Opportunity");

    let mut extras = Extras::new();
    extras.insert("username".to_string(), json!(username));
    extras.insert("message_id".to_string(), json!(message.id));
    extras.insert(
        "date".to_string(),
        message
            .date
            .map(|d| Value::String(d.to_rfc3339()))
            .unwrap_or(Value::Null),
    );
    extras.insert(
        "views".to_string(),
        message.views.clone().map(Value::String).unwrap_or(Value::Null),
    );

    let title: String = first_line.chars().take(MAX_TITLE_CHARS).collect();
    Some(
        RawItem::new(title, message_link(username, message.id))
            .description(text)
            .category(category)
            .company("")
            .location("Remote")
            .tags(Vec::new())
            .extras(extras)
            .raw_text(text),
    )
}
