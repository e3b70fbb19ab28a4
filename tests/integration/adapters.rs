//! Adapters running against mock job boards

use crate::{fast_fetcher, padded};
use remotebridge::adapters::{Adapter, AdapterRegistry, RemoteOk, Remotive, WeWorkRemotelyRss};
use remotebridge::model::PayPeriod;
use remotebridge::AdapterError;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_remotive_adapter_reads_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/remote-jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job-count": 2,
            "jobs": [
                {
                    "title": "Backend Engineer",
                    "company_name": "Acme",
                    "candidate_required_location": "Worldwide (remote)",
                    "url": "https://remotive.com/remote-jobs/software-dev/backend-1",
                    "description": "<p>Rust and Postgres</p>",
                    "job_type": "full_time",
                    "category": "Software Development",
                    "salary": "$90k - $110k per year"
                },
                {
                    "title": "Office Manager",
                    "company_name": "Local Co",
                    "candidate_required_location": "Berlin",
                    "url": "https://remotive.com/remote-jobs/admin/office-2",
                    "description": "On site"
                }
            ]
        })))
        .mount(&server)
        .await;

    let adapter = Remotive::with_base(fast_fetcher(), &server.uri());
    let items = adapter.fetch_raw_items().await.unwrap();

    assert_eq!(items.len(), 2);
    let item = &items[0];
    assert_eq!(item.title, "Backend Engineer");
    assert_eq!(item.company.as_deref(), Some("Acme"));
    assert_eq!(item.description.as_deref(), Some("Rust and Postgres"));
    assert_eq!(item.salary_min, Some(90_000.0));
    assert_eq!(item.salary_max, Some(110_000.0));
    assert_eq!(item.currency.as_deref(), Some("USD"));
    assert_eq!(item.period, Some(PayPeriod::Yearly));
    assert_eq!(items[1].location.as_deref(), Some("Berlin"));
}

#[tokio::test]
async fn test_remoteok_adapter_skips_notice() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"legal": "API terms of service"},
            {
                "position": "Senior Go Developer",
                "company": "Remote First Inc",
                "url": "https://remoteok.com/remote-jobs/1",
                "tags": ["golang", "backend"],
                "salary_min": 100000,
                "salary_max": 140000,
                "description": "Distributed systems"
            }
        ])))
        .mount(&server)
        .await;

    let adapter = RemoteOk::with_base(fast_fetcher(), &server.uri());
    let items = adapter.fetch_raw_items().await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Senior Go Developer");
    assert_eq!(items[0].salary_min, Some(100_000.0));
    assert_eq!(items[0].salary_max, Some(140_000.0));
}

#[tokio::test]
async fn test_wwr_feed_adapter() {
    let server = MockServer::start().await;
    let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>We Work Remotely</title>
<item>
  <title>Acme: Senior Rust Engineer</title>
  <link>https://weworkremotely.com/remote-jobs/acme-senior-rust-engineer</link>
  <description>&lt;p&gt;Work from anywhere&lt;/p&gt;</description>
  <pubDate>Wed, 01 May 2024 10:00:00 +0000</pubDate>
</item>
</channel></rss>"#;
    Mock::given(method("GET"))
        .and(path("/remote-jobs.rss"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/rss+xml")
                .set_body_string(feed),
        )
        .mount(&server)
        .await;

    let adapter = WeWorkRemotelyRss::with_base(fast_fetcher(), &server.uri());
    let items = adapter.fetch_raw_items().await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Senior Rust Engineer");
    assert_eq!(items[0].company.as_deref(), Some("Acme"));
    assert_eq!(items[0].description.as_deref(), Some("Work from anywhere"));
}

#[tokio::test]
async fn test_broken_board_surfaces_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string(padded("oops")))
        .mount(&server)
        .await;

    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(Remotive::with_base(fast_fetcher(), &server.uri())));

    let err = registry.run("remotive").await.unwrap_err();
    assert!(matches!(err, AdapterError::Fetch(_)));
    assert!(matches!(
        registry.run("nope").await,
        Err(AdapterError::Unknown(_))
    ));
}
