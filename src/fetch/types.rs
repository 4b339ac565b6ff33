// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core request/response types for the fetch and analyze pipelines

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Hard cap on bytes read from any response body (10 MiB)
pub const MAX_CONTENT_BYTES: usize = 10 * 1024 * 1024;

/// Allowed range for `FetchRequest::timeout_seconds`
pub const FETCH_TIMEOUT_RANGE: (u64, u64) = (1, 120);

/// Allowed range for `AnalyzeRequest::timeout_seconds`
pub const ANALYZE_TIMEOUT_RANGE: (u64, u64) = (1, 60);

/// Default fetch timeout in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Default analyze timeout in seconds
pub const DEFAULT_ANALYZE_TIMEOUT_SECS: u64 = 10;

/// Metadata mapping. Keys come from a fixed known set.
pub type Metadata = BTreeMap<String, String>;

/// Outbound request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMethod {
    Get,
    Head,
}

impl FetchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchMethod::Get => "GET",
            FetchMethod::Head => "HEAD",
        }
    }
}

/// A validated fetch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub extract_text: bool,
    pub follow_redirects: bool,
    pub timeout_seconds: u64,
}

impl FetchRequest {
    /// Create a request with the default options
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            extract_text: true,
            follow_redirects: true,
            timeout_seconds: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }

    pub fn with_extract_text(mut self, extract_text: bool) -> Self {
        self.extract_text = extract_text;
        self
    }

    pub fn with_follow_redirects(mut self, follow_redirects: bool) -> Self {
        self.follow_redirects = follow_redirects;
        self
    }

    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Validate the request
    pub fn validate(&self) -> Result<(), String> {
        validate_url(&self.url)?;
        validate_timeout(self.timeout_seconds, FETCH_TIMEOUT_RANGE)
    }
}

/// A validated analyze request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeRequest {
    pub url: String,
    pub timeout_seconds: u64,
}

impl AnalyzeRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_seconds: DEFAULT_ANALYZE_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Validate the request
    pub fn validate(&self) -> Result<(), String> {
        validate_url(&self.url)?;
        validate_timeout(self.timeout_seconds, ANALYZE_TIMEOUT_RANGE)
    }
}

/// Parse `raw` and require an absolute http(s) URL with a host
pub fn parse_http_url(raw: &str) -> Result<Url, String> {
    let parsed = Url::parse(raw.trim()).map_err(|e| format!("invalid URL: {}", e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!(
            "URL scheme should be 'http' or 'https', got '{}'",
            parsed.scheme()
        ));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err("URL must include a host".to_string());
    }
    Ok(parsed)
}

fn validate_url(raw: &str) -> Result<(), String> {
    if raw.trim().is_empty() {
        return Err("url cannot be empty".to_string());
    }
    parse_http_url(raw).map(|_| ())
}

fn validate_timeout(timeout: u64, (min, max): (u64, u64)) -> Result<(), String> {
    if timeout < min || timeout > max {
        return Err(format!(
            "timeout must be between {} and {} seconds, got {}",
            min, max, timeout
        ));
    }
    Ok(())
}

/// Raw response handed from the fetcher to the classifier
///
/// `body.len()` never exceeds the configured byte cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status_code: u16,
    /// Raw `Content-Type` header value (empty when absent)
    pub content_type: String,
    pub declared_content_length: Option<u64>,
    /// Raw `Location` header value, if any
    pub location: Option<String>,
    pub body: Vec<u8>,
    pub truncated: bool,
    pub final_url: String,
}

impl RawResponse {
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status_code)
    }
}

/// Output of the HTML extractor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    pub title: Option<String>,
    pub text: String,
    pub word_count: usize,
    pub metadata: Metadata,
}

/// Count whitespace-delimited tokens
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Response body of the fetch pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    /// The URL that was requested
    pub url: String,
    /// Page title if available
    pub title: Option<String>,
    /// Extracted text content
    pub content: String,
    /// Content-Type header as returned by the server
    pub content_type: String,
    /// HTTP status code of the response
    pub status_code: u16,
    /// Number of whitespace-separated words in `content`
    pub word_count: usize,
    /// Additional metadata about the content
    #[serde(default)]
    pub metadata: Metadata,
}

/// Response body of the analyze pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResult {
    pub url: String,
    pub is_accessible: bool,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub status_code: Option<u16>,
    pub error_message: Option<String>,
}
