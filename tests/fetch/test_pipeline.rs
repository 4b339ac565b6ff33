// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end fetch and analyze pipeline tests

use super::support::{closed_addr, spawn_upstream, url};
use fabstir_url_access::fetch::{
    AnalyzeRequest, FetchConfig, FetchError, FetchRequest, UrlAccessService,
};

fn service() -> UrlAccessService {
    UrlAccessService::new(FetchConfig::default()).unwrap()
}

fn whitespace_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

#[tokio::test]
async fn test_fetch_example_page() {
    let addr = spawn_upstream().await;
    let request = FetchRequest::new(url(addr, "/page"));

    let result = service().fetch(&request).await.unwrap();
    assert_eq!(result.url, url(addr, "/page"));
    assert_eq!(result.title.as_deref(), Some("Example"));
    assert_eq!(result.content, "Hello world.");
    assert_eq!(result.word_count, 2);
    assert_eq!(result.status_code, 200);
    assert_eq!(result.content_type, "text/html; charset=utf-8");
    assert_eq!(result.metadata.len(), 1);
    assert_eq!(result.metadata["description"], "desc");
}

#[tokio::test]
async fn test_fetch_without_text_extraction() {
    let addr = spawn_upstream().await;
    let request = FetchRequest::new(url(addr, "/page")).with_extract_text(false);

    let result = service().fetch(&request).await.unwrap();
    assert_eq!(result.title.as_deref(), Some("Example"));
    assert_eq!(result.content, "");
    assert_eq!(result.word_count, 0);
    assert_eq!(result.metadata["description"], "desc");
}

#[tokio::test]
async fn test_fetch_binary_degrades_to_empty() {
    let addr = spawn_upstream().await;
    let request = FetchRequest::new(url(addr, "/binary"));

    let result = service().fetch(&request).await.unwrap();
    assert_eq!(result.content, "");
    assert_eq!(result.title, None);
    assert_eq!(result.word_count, 0);
    assert_eq!(result.content_type, "application/octet-stream");
}

#[tokio::test]
async fn test_fetch_json_pretty_printed() {
    let addr = spawn_upstream().await;
    let request = FetchRequest::new(url(addr, "/json"));

    let result = service().fetch(&request).await.unwrap();
    let reparsed: serde_json::Value = serde_json::from_str(&result.content).unwrap();
    assert_eq!(
        reparsed,
        serde_json::json!({"zeta": 1, "alpha": [true, null], "mid": "x"})
    );
    assert!(result.content.contains('\n'));
    assert_eq!(result.metadata["json_keys"], "zeta, alpha, mid");
    assert_eq!(result.word_count, whitespace_tokens(&result.content));
}

#[tokio::test]
async fn test_fetch_plain_text_verbatim() {
    let addr = spawn_upstream().await;
    let request = FetchRequest::new(url(addr, "/text"));

    let result = service().fetch(&request).await.unwrap();
    assert_eq!(result.content, "one two  three\nfour");
    assert_eq!(result.word_count, 4);
}

#[tokio::test]
async fn test_fetch_declared_charset() {
    let addr = spawn_upstream().await;
    let request = FetchRequest::new(url(addr, "/latin1"));

    let result = service().fetch(&request).await.unwrap();
    assert_eq!(result.content, "café");
}

#[tokio::test]
async fn test_fetch_deeply_nested_page() {
    let addr = spawn_upstream().await;
    let request = FetchRequest::new(url(addr, "/deep"));

    let result = service().fetch(&request).await.unwrap();
    assert_eq!(result.title.as_deref(), Some("Deep"));
    assert_eq!(result.content, "bottom");
    assert_eq!(result.word_count, 1);

    // the service keeps serving afterwards
    let result = service()
        .fetch(&FetchRequest::new(url(addr, "/page")))
        .await
        .unwrap();
    assert_eq!(result.content, "Hello world.");
}

#[tokio::test]
async fn test_fetch_undecodable_body_fails() {
    let addr = spawn_upstream().await;
    let request = FetchRequest::new(url(addr, "/invalid-utf8"));

    let err = service().fetch(&request).await.unwrap_err();
    assert!(matches!(err, FetchError::DecodeFailed { .. }));
    assert_eq!(err.status_code(), 422);
}

#[tokio::test]
async fn test_fetch_redirect_metadata() {
    let addr = spawn_upstream().await;

    let followed = service()
        .fetch(&FetchRequest::new(url(addr, "/redirect")))
        .await
        .unwrap();
    assert_eq!(followed.title.as_deref(), Some("Example"));
    assert_eq!(followed.metadata["final_url"], url(addr, "/page"));

    let stopped = service()
        .fetch(&FetchRequest::new(url(addr, "/redirect")).with_follow_redirects(false))
        .await
        .unwrap();
    assert_eq!(stopped.status_code, 302);
    assert_eq!(stopped.content, "");
    assert_eq!(stopped.metadata["redirect_location"], "/page");
    assert!(!stopped.metadata.contains_key("final_url"));
}

#[tokio::test]
async fn test_fetch_too_large_is_error_not_truncated_success() {
    let addr = spawn_upstream().await;
    let err = service()
        .fetch(&FetchRequest::new(url(addr, "/big-chunked")))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::TooLarge { .. }));
    assert_eq!(err.to_string(), "Content too large (max 10MB)");
}

#[tokio::test]
async fn test_analyze_accessible_page() {
    let addr = spawn_upstream().await;
    let request = AnalyzeRequest::new(url(addr, "/page"));

    let result = service().analyze(&request).await;
    assert!(result.is_accessible);
    assert_eq!(result.status_code, Some(200));
    assert_eq!(result.content_type.as_deref(), Some("text/html; charset=utf-8"));
    assert_eq!(
        result.content_length,
        Some(super::support::EXAMPLE_PAGE.len() as u64)
    );
    assert_eq!(result.error_message, None);
}

#[tokio::test]
async fn test_analyze_not_found() {
    let addr = spawn_upstream().await;
    let request = AnalyzeRequest::new(url(addr, "/missing"));

    let result = service().analyze(&request).await;
    assert!(!result.is_accessible);
    assert_eq!(result.status_code, Some(404));
    assert_eq!(result.error_message.as_deref(), Some("HTTP error: 404 Not Found"));
}

#[tokio::test]
async fn test_analyze_unreachable_is_in_band() {
    let addr = closed_addr().await;
    let request = AnalyzeRequest::new(url(addr, "/")).with_timeout_seconds(5);

    let result = service().analyze(&request).await;
    assert!(!result.is_accessible);
    assert_eq!(result.status_code, None);
    assert_eq!(result.content_type, None);
    assert_eq!(
        result.error_message.as_deref(),
        Some("Unable to connect to the URL")
    );
}

#[tokio::test]
async fn test_analyze_timeout_is_in_band() {
    let addr = spawn_upstream().await;
    let request = AnalyzeRequest::new(url(addr, "/stall")).with_timeout_seconds(1);

    let result = service().analyze(&request).await;
    assert!(!result.is_accessible);
    assert_eq!(result.error_message.as_deref(), Some("Request timeout"));
}
