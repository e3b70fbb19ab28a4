//! Channel ingestion through a mocked web preview

use crate::fast_fetcher;
use chrono::{Duration, Utc};
use remotebridge::adapters::AdapterRegistry;
use remotebridge::channels::{collect_recent, TelegramPreview};
use remotebridge::config::{SchedulerConfig, SourceEntry};
use remotebridge::crawler::Coordinator;
use remotebridge::model::Category;
use remotebridge::storage::{SharedStorage, SqliteStorage, Storage};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn message_block(id: i64, age_days: i64, text: &str) -> String {
    let date = (Utc::now() - Duration::days(age_days)).to_rfc3339();
    format!(
        r#"<div class="tgme_widget_message_wrap"><div class="tgme_widget_message js-widget_message" data-post="remotejobs/{id}">
<div class="tgme_widget_message_text js-message_text">{text}</div>
<span class="tgme_widget_message_views">{id}</span>
<a class="tgme_widget_message_date"><time datetime="{date}">now</time></a>
</div></div>"#
    )
}

fn page(blocks: &[String]) -> String {
    format!(
        "<html><body><section class=\"tgme_channel_history\">{}</section></body></html>",
        blocks.concat()
    )
}

async fn mount_channel(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/s/remotejobs"))
        .and(query_param("before", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(&[
            message_block(98, 30, "Old posting"),
            message_block(99, 2, "Remote Python developer<br/>$50/hour"),
        ])))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/s/remotejobs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(&[
            message_block(100, 1, "Senior Rust Engineer (Remote)<br/>€80k-€100k/year"),
            message_block(101, 0, "Remote QA contractor"),
        ])))
        .with_priority(2)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_scan_pages_back_to_cutoff() {
    let server = MockServer::start().await;
    mount_channel(&server).await;

    let preview = TelegramPreview::new(fast_fetcher(), &server.uri());
    let cutoff = Utc::now() - Duration::days(7);
    let messages = collect_recent(&preview, "remotejobs", cutoff, 300)
        .await
        .unwrap();

    let ids: Vec<i64> = messages.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![101, 100, 99]);
    assert_eq!(messages[1].views.as_deref(), Some("100"));
}

#[tokio::test]
async fn test_channel_tick_persists_listings() {
    let server = MockServer::start().await;
    mount_channel(&server).await;

    let storage = SharedStorage::new(SqliteStorage::new_in_memory().unwrap());
    let reader = Arc::new(TelegramPreview::new(fast_fetcher(), &server.uri()));
    let coordinator = Coordinator::new(
        storage.clone(),
        AdapterRegistry::new(),
        reader,
        &SchedulerConfig::default(),
    );
    coordinator
        .seed_sources(&[SourceEntry::channel(
            "@remotejobs",
            "https://t.me/remotejobs",
            Category::Job,
        )])
        .unwrap();

    let summary = coordinator.crawl_channels_once().await.unwrap();
    assert_eq!(summary.new_listings, 3);

    let store = storage.lock().unwrap();
    let source = store.get_source_by_name("@remotejobs").unwrap().unwrap();
    let record = store
        .get_listing(source.id, "https://t.me/remotejobs/100")
        .unwrap()
        .unwrap();
    assert_eq!(record.listing.title, "Senior Rust Engineer (Remote)");
    assert_eq!(record.listing.location, "Remote");
    assert_eq!(record.listing.salary_min, Some(80_000.0));
    assert_eq!(record.listing.salary_max, Some(100_000.0));
    assert_eq!(record.listing.currency, "EUR");
    assert_eq!(record.listing.extras["message_id"], 100);
}
