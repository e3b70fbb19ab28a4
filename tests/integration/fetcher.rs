//! Retry, fallback and JSON behavior of the fetcher against a mock server

use crate::{fast_config, fast_fetcher, padded};
use async_trait::async_trait;
use remotebridge::crawler::{ChallengeSolver, FetchOptions, Fetcher, SolvedPage};
use remotebridge::FetchError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_recovers_after_two_failed_attempts() {
    let server = MockServer::start().await;

    // Each failed attempt makes a primary and a JSON-accept request
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .up_to_n_times(4)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(padded("<html>jobs</html>")))
        .mount(&server)
        .await;

    let report = fast_fetcher()
        .fetch_report(&format!("{}/jobs", server.uri()), &FetchOptions::default())
        .await
        .unwrap();

    assert_eq!(report.status, 200);
    assert!(report.body.starts_with("<html>jobs</html>"));
    assert_eq!(report.attempts, 3);
    assert_eq!(report.delays.len(), 2);
    assert!(report.delays.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(report.delays[0], Duration::from_millis(10));
    assert_eq!(report.delays[1], Duration::from_millis(20));
}

#[tokio::test]
async fn test_exhausted_after_every_attempt_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let mut config = fast_config();
    config.max_attempts = 2;
    let fetcher = Fetcher::new(&config).unwrap();

    let err = fetcher
        .fetch(&format!("{}/jobs", server.uri()), &FetchOptions::default())
        .await
        .unwrap_err();

    match err {
        FetchError::Exhausted {
            attempts, status, ..
        } => {
            assert_eq!(attempts, 2);
            assert_eq!(status, Some(503));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_blockpage_triggers_second_request_in_same_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_string(padded(
            "<html><title>Just a moment...</title>Checking your browser</html>",
        )))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_string(
                    r#"[{"legal":"notice"},{"position":"Remote Rust Engineer","url":"https://x/1"}]"#,
                ),
        )
        .mount(&server)
        .await;

    let report = fast_fetcher()
        .fetch_report(&format!("{}/api", server.uri()), &FetchOptions::default())
        .await
        .unwrap();
    assert_eq!(report.attempts, 1);
    assert!(report.delays.is_empty());
    assert!(report.body.contains("Remote Rust Engineer"));
}

struct CountingSolver {
    calls: AtomicUsize,
}

#[async_trait]
impl ChallengeSolver for CountingSolver {
    async fn solve(&self, _url: &str, _timeout: Duration) -> Result<SolvedPage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SolvedPage {
            status: 200,
            body: padded("<html><ul><li>Solved listing</li></ul></html>"),
        })
    }
}

#[tokio::test]
async fn test_challenge_solver_is_last_resort() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string(padded("Access denied")))
        .mount(&server)
        .await;

    let solver = Arc::new(CountingSolver {
        calls: AtomicUsize::new(0),
    });
    let fetcher = fast_fetcher().with_solver(solver.clone());

    let body = fetcher
        .fetch(&format!("{}/board", server.uri()), &FetchOptions::default())
        .await
        .unwrap();
    assert!(body.contains("Solved listing"));
    assert_eq!(solver.calls.load(Ordering::SeqCst), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_fetch_json_unwraps_markup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/remote-jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><pre>{"jobs": [{"title": "Remote QA"}]}</pre></body></html>"#,
        ))
        .mount(&server)
        .await;

    let value = fast_fetcher()
        .fetch_json(
            &format!("{}/api/remote-jobs", server.uri()),
            &FetchOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(value["jobs"][0]["title"], "Remote QA");
}

#[tokio::test]
async fn test_requests_carry_browser_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header_exists("user-agent"))
        .and(header("referer", format!("{}/", server.uri()).as_str()))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .respond_with(ResponseTemplate::new(200).set_body_string(padded("<html>ok</html>")))
        .expect(1)
        .mount(&server)
        .await;

    let body = fast_fetcher()
        .fetch(
            &format!("{}/page", server.uri()),
            &FetchOptions::default().header("X-Requested-With", "XMLHttpRequest"),
        )
        .await
        .unwrap();
    assert!(body.starts_with("<html>ok</html>"));
}
