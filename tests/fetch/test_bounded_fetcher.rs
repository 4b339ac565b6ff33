// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! BoundedFetcher tests against an in-process upstream
//!
//! Covers the wall-clock deadline, the streaming byte cap (declared and
//! chunked bodies), redirect modes, HEAD requests and cancellation.

use super::support::{closed_addr, spawn_upstream, url, CAP};
use fabstir_url_access::fetch::{
    AnalyzeRequest, BoundedFetcher, FetchConfig, FetchError, FetchRequest, FetchTarget,
};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

fn fetcher() -> BoundedFetcher {
    BoundedFetcher::new(FetchConfig::default()).unwrap()
}

#[tokio::test]
async fn test_get_returns_raw_response() {
    let addr = spawn_upstream().await;
    let request = FetchRequest::new(url(addr, "/page"));

    let raw = fetcher().fetch(FetchTarget::from(&request)).await.unwrap();
    assert_eq!(raw.status_code, 200);
    assert_eq!(raw.content_type, "text/html; charset=utf-8");
    assert!(String::from_utf8_lossy(&raw.body).contains("<title>Example</title>"));
    assert!(!raw.truncated);
    assert_eq!(raw.final_url, url(addr, "/page"));
}

#[tokio::test]
async fn test_stalled_server_times_out_at_deadline() {
    let addr = spawn_upstream().await;
    let request = FetchRequest::new(url(addr, "/stall")).with_timeout_seconds(1);

    let started = Instant::now();
    let err = fetcher().fetch(FetchTarget::from(&request)).await.unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(err, FetchError::Timeout { timeout_secs: 1 });
    assert_eq!(err.status_code(), 408);
    assert!(
        elapsed < Duration::from_secs(3),
        "timeout took {:?}, expected ~1s",
        elapsed
    );
}

#[tokio::test]
async fn test_deadline_covers_body_read() {
    let addr = spawn_upstream().await;
    let request = FetchRequest::new(url(addr, "/headers-then-stall")).with_timeout_seconds(1);

    let started = Instant::now();
    let err = fetcher().fetch(FetchTarget::from(&request)).await.unwrap_err();

    assert!(matches!(err, FetchError::Timeout { .. }));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_declared_length_over_cap_is_too_large() {
    let addr = spawn_upstream().await;
    let request = FetchRequest::new(url(addr, "/big-declared"));

    let err = fetcher().fetch(FetchTarget::from(&request)).await.unwrap_err();
    assert_eq!(err, FetchError::TooLarge { limit: CAP });
    assert_eq!(err.status_code(), 413);
}

#[tokio::test]
async fn test_chunked_body_one_byte_over_cap_is_too_large() {
    let addr = spawn_upstream().await;
    let request = FetchRequest::new(url(addr, "/big-chunked"));

    let err = fetcher().fetch(FetchTarget::from(&request)).await.unwrap_err();
    assert_eq!(err, FetchError::TooLarge { limit: CAP });
}

#[tokio::test]
async fn test_body_exactly_at_cap_succeeds() {
    let addr = spawn_upstream().await;
    let request = FetchRequest::new(url(addr, "/exact-cap"));

    let raw = fetcher().fetch(FetchTarget::from(&request)).await.unwrap();
    assert_eq!(raw.body.len(), CAP);
    assert!(!raw.truncated);
}

#[tokio::test]
async fn test_truncate_mode_cuts_at_cap() {
    let addr = spawn_upstream().await;
    let config = FetchConfig {
        max_content_bytes: 1024,
        truncate_oversized: true,
        ..FetchConfig::default()
    };
    let fetcher = BoundedFetcher::new(config).unwrap();

    for path in ["/big-chunked", "/big-declared"] {
        let request = FetchRequest::new(url(addr, path));
        let raw = fetcher.fetch(FetchTarget::from(&request)).await.unwrap();
        assert_eq!(raw.body.len(), 1024, "{}", path);
        assert!(raw.truncated, "{}", path);
    }
}

#[tokio::test]
async fn test_redirect_followed() {
    let addr = spawn_upstream().await;
    let request = FetchRequest::new(url(addr, "/redirect"));

    let raw = fetcher().fetch(FetchTarget::from(&request)).await.unwrap();
    assert_eq!(raw.status_code, 200);
    assert_eq!(raw.final_url, url(addr, "/page"));
}

#[tokio::test]
async fn test_redirect_not_followed() {
    let addr = spawn_upstream().await;
    let request = FetchRequest::new(url(addr, "/redirect")).with_follow_redirects(false);

    let raw = fetcher().fetch(FetchTarget::from(&request)).await.unwrap();
    assert_eq!(raw.status_code, 302);
    assert_eq!(raw.location.as_deref(), Some("/page"));
    assert_eq!(raw.final_url, url(addr, "/redirect"));
}

#[tokio::test]
async fn test_get_error_status_is_upstream_error() {
    let addr = spawn_upstream().await;

    let request = FetchRequest::new(url(addr, "/missing"));
    let err = fetcher().fetch(FetchTarget::from(&request)).await.unwrap_err();
    assert_eq!(err, FetchError::UpstreamError { status: 404 });
    assert_eq!(err.status_code(), 404);

    let request = FetchRequest::new(url(addr, "/error"));
    let err = fetcher().fetch(FetchTarget::from(&request)).await.unwrap_err();
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn test_head_keeps_error_status_and_headers() {
    let addr = spawn_upstream().await;

    let request = AnalyzeRequest::new(url(addr, "/missing"));
    let raw = fetcher().fetch(FetchTarget::from(&request)).await.unwrap();
    assert_eq!(raw.status_code, 404);
    assert!(raw.body.is_empty());

    let request = AnalyzeRequest::new(url(addr, "/page"));
    let raw = fetcher().fetch(FetchTarget::from(&request)).await.unwrap();
    assert_eq!(raw.status_code, 200);
    assert_eq!(raw.content_type, "text/html; charset=utf-8");
    assert!(raw.body.is_empty());
}

#[tokio::test]
async fn test_connection_refused() {
    let addr = closed_addr().await;
    let request = FetchRequest::new(url(addr, "/")).with_timeout_seconds(5);

    let err = fetcher().fetch(FetchTarget::from(&request)).await.unwrap_err();
    assert!(matches!(err, FetchError::ConnectionFailed { .. }), "{:?}", err);
    assert_eq!(err.status_code(), 503);
}

#[tokio::test]
async fn test_outbound_headers() {
    let addr = spawn_upstream().await;
    let request = FetchRequest::new(url(addr, "/echo-headers"));

    let raw = fetcher().fetch(FetchTarget::from(&request)).await.unwrap();
    let echoed: serde_json::Value = serde_json::from_slice(&raw.body).unwrap();
    assert!(echoed["user_agent"]
        .as_str()
        .unwrap()
        .contains("FabstirUrlAccess"));
    assert!(echoed["accept"].as_str().unwrap().starts_with("text/html"));
    assert_eq!(echoed["accept_language"], "en-US,en;q=0.5");
}

#[tokio::test]
async fn test_cancellation_aborts_promptly() {
    let addr = spawn_upstream().await;
    let request = FetchRequest::new(url(addr, "/stall")).with_timeout_seconds(30);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = fetcher()
        .fetch_cancellable(FetchTarget::from(&request), &cancel)
        .await
        .unwrap_err();

    assert_eq!(err, FetchError::Cancelled);
    assert_eq!(err.status_code(), 499);
    assert!(started.elapsed() < Duration::from_secs(2));
}
