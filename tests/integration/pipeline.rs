//! Crawl, dedup and publish end-to-end against mock services

use crate::{fast_fetcher, padded};
use async_trait::async_trait;
use remotebridge::adapters::{Adapter, AdapterRegistry, RemoteOk, Remotive};
use remotebridge::channels::{ChannelMessage, ChannelReader};
use remotebridge::config::{SchedulerConfig, SourceEntry};
use remotebridge::crawler::Coordinator;
use remotebridge::model::Category;
use remotebridge::publish::{Messenger, PublishOutcome, Publisher, TelegramMessenger};
use remotebridge::storage::{SharedStorage, SqliteStorage, Storage};
use remotebridge::{ChannelError, SendError};
use serde_json::json;
use std::sync::Arc;
use std::sync::Mutex;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct NoChannels;

#[async_trait]
impl ChannelReader for NoChannels {
    async fn fetch_page(
        &self,
        _username: &str,
        _before: Option<i64>,
    ) -> Result<Vec<ChannelMessage>, ChannelError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl Messenger for Outbox {
    async fn send(&self, _destination: &str, text: &str) -> Result<(), SendError> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn remotive_payload(salary: &str) -> serde_json::Value {
    json!({"jobs": [
        {
            "title": "Platform Engineer",
            "company_name": "Acme",
            "candidate_required_location": "Worldwide",
            "url": "https://remotive.com/remote-jobs/1",
            "description": "Kubernetes and Terraform",
            "salary": salary
        },
        {
            "title": "Data Analyst",
            "company_name": "Beta",
            "candidate_required_location": "Americas",
            "url": "https://remotive.com/remote-jobs/2",
            "description": "SQL dashboards"
        }
    ]})
}

async fn board(payload: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/remote-jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(&server)
        .await;
    server
}

fn coordinator(storage: SharedStorage, registry: AdapterRegistry) -> Coordinator {
    Coordinator::new(
        storage,
        registry,
        Arc::new(NoChannels),
        &SchedulerConfig::default(),
    )
}

#[tokio::test]
async fn test_broken_source_does_not_block_others() {
    let good = board(remotive_payload("$120k/year")).await;
    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string(padded("bad gateway")))
        .mount(&broken)
        .await;

    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(Remotive::with_base(fast_fetcher(), &good.uri())));
    registry.register(Arc::new(RemoteOk::with_base(fast_fetcher(), &broken.uri())));

    let storage = SharedStorage::new(SqliteStorage::new_in_memory().unwrap());
    let coordinator = coordinator(storage.clone(), registry);
    coordinator
        .seed_sources(&[
            SourceEntry::website("RemoteOK", &broken.uri(), Category::Job, "remoteok"),
            SourceEntry::website("Remotive", &good.uri(), Category::Job, "remotive"),
        ])
        .unwrap();

    let summary = coordinator.crawl_websites_once().await.unwrap();
    assert_eq!(summary.sources, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.new_listings, 2);

    let store = storage.lock().unwrap();
    assert_eq!(store.count_listings().unwrap(), 2);
    let broken_source = store.get_source_by_name("RemoteOK").unwrap().unwrap();
    assert!(broken_source.last_crawled.is_none());
}

#[tokio::test]
async fn test_recrawl_keeps_published_flag() {
    let server = board(remotive_payload("$120k/year")).await;
    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(Remotive::with_base(fast_fetcher(), &server.uri())));

    let storage = SharedStorage::new(SqliteStorage::new_in_memory().unwrap());
    let coordinator = coordinator(storage.clone(), registry);
    coordinator
        .seed_sources(&[SourceEntry::website(
            "Remotive",
            &server.uri(),
            Category::Job,
            "remotive",
        )])
        .unwrap();
    coordinator.crawl_websites_once().await.unwrap();

    let outbox = Arc::new(Outbox::default());
    let publisher = Publisher::new(storage.clone(), outbox.clone(), "@feed");
    let published_id = match publisher.publish_once().await.unwrap() {
        PublishOutcome::Published(id) => id,
        other => panic!("expected a published listing, got {other:?}"),
    };

    let second = coordinator.crawl_websites_once().await.unwrap();
    assert_eq!(second.new_listings, 0);

    let store = storage.lock().unwrap();
    assert_eq!(store.count_listings().unwrap(), 2);
    assert_eq!(store.count_unpublished().unwrap(), 1);
    let source = store.get_source_by_name("Remotive").unwrap().unwrap();
    let first = store
        .get_listing(source.id, "https://remotive.com/remote-jobs/1")
        .unwrap()
        .unwrap();
    assert_eq!(first.id, published_id);
    assert!(first.published);
}

#[tokio::test]
async fn test_publisher_throttles_to_one_per_tick() {
    let storage = SharedStorage::new(SqliteStorage::new_in_memory().unwrap());
    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(FiveJobs));
    let coordinator = coordinator(storage.clone(), registry);
    coordinator
        .seed_sources(&[SourceEntry::website(
            "Five",
            "https://five.example",
            Category::Job,
            "five",
        )])
        .unwrap();
    coordinator.crawl_websites_once().await.unwrap();

    let outbox = Arc::new(Outbox::default());
    let publisher = Publisher::new(storage.clone(), outbox.clone(), "@feed");
    publisher.publish_once().await.unwrap();

    assert_eq!(outbox.sent.lock().unwrap().len(), 1);
    assert_eq!(storage.lock().unwrap().count_unpublished().unwrap(), 4);
}

struct FiveJobs;

#[async_trait]
impl Adapter for FiveJobs {
    fn id(&self) -> &str {
        "five"
    }

    async fn fetch_raw_items(
        &self,
    ) -> Result<Vec<remotebridge::RawItem>, remotebridge::AdapterError> {
        Ok((0..5)
            .map(|i| {
                remotebridge::RawItem::new(
                    format!("Remote role {i}"),
                    format!("https://five.example/{i}"),
                )
            })
            .collect())
    }
}

#[tokio::test]
async fn test_salary_gate_in_published_message() {
    for (salary, expected) in [("$50/year", false), ("$90000/year", true)] {
        let server = board(remotive_payload(salary)).await;
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(Remotive::with_base(fast_fetcher(), &server.uri())));

        let storage = SharedStorage::new(SqliteStorage::new_in_memory().unwrap());
        let coordinator = coordinator(storage.clone(), registry);
        coordinator
            .seed_sources(&[SourceEntry::website(
                "Remotive",
                &server.uri(),
                Category::Job,
                "remotive",
            )])
            .unwrap();
        coordinator.crawl_websites_once().await.unwrap();

        let outbox = Arc::new(Outbox::default());
        Publisher::new(storage, outbox.clone(), "@feed")
            .publish_once()
            .await
            .unwrap();

        let sent = outbox.sent.lock().unwrap();
        assert!(sent[0].contains("📌 Title: Platform Engineer"));
        assert_eq!(sent[0].contains("💰 Salary:"), expected, "salary {salary}");
    }
}

#[tokio::test]
async fn test_telegram_messenger_delivery() {
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_partial_json(json!({
            "chat_id": "@feed",
            "disable_web_page_preview": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"message_id": 1}
        })))
        .expect(1)
        .mount(&api)
        .await;

    let messenger = TelegramMessenger::new(&api.uri(), "123:abc").unwrap();
    messenger.send("@feed", "hello").await.unwrap();
}

#[tokio::test]
async fn test_rejected_send_keeps_listing_queued() {
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .mount(&api)
        .await;

    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let source_id = storage
        .seed_source(&SourceEntry::website(
            "Jobs",
            "https://jobs.example",
            Category::Job,
            "remotive",
        ))
        .unwrap();
    let listing = remotebridge::crawler::normalize_item(
        remotebridge::RawItem::new("Remote SRE", "https://jobs.example/1"),
        Category::Job,
    )
    .unwrap();
    storage.persist_listings(source_id, &[listing]).unwrap();
    let storage = SharedStorage::new(storage);

    let messenger = Arc::new(TelegramMessenger::new(&api.uri(), "123:abc").unwrap());
    let publisher = Publisher::new(storage.clone(), messenger, "@missing");

    let outcome = publisher.publish_once().await.unwrap();
    assert!(matches!(outcome, PublishOutcome::SendFailed(_)));
    assert_eq!(storage.lock().unwrap().count_unpublished().unwrap(), 1);
}
