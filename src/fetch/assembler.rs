// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Result assembly
//!
//! Combines the classifier decision, the extractor output and the fetch
//! metadata into the two wire shapes. Error-to-status mapping lives on
//! [`FetchError::status_code`].

use url::Url;

use super::error::FetchError;
use super::json::FormattedJson;
use super::meta::{FINAL_URL_KEY, JSON_KEYS_KEY, REDIRECT_LOCATION_KEY};
use super::types::{
    count_words, AnalyzeRequest, AnalyzeResult, ExtractedContent, FetchRequest, FetchResult,
    Metadata, RawResponse,
};

/// Extractor output for one response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Html(ExtractedContent),
    Json(FormattedJson),
    Text(String),
    /// Binary or unknown content; nothing is extracted
    Empty,
}

/// Build the fetch result for a successful fetch
pub fn build_fetch_result(
    request: &FetchRequest,
    raw: &RawResponse,
    extraction: Extraction,
) -> FetchResult {
    let (title, content, mut metadata) = match extraction {
        Extraction::Html(extracted) => (extracted.title, extracted.text, extracted.metadata),
        Extraction::Json(formatted) => {
            let mut metadata = Metadata::new();
            if !formatted.keys.is_empty() {
                metadata.insert(JSON_KEYS_KEY.to_string(), formatted.keys.join(", "));
            }
            (None, formatted.text, metadata)
        }
        Extraction::Text(text) => (None, text, Metadata::new()),
        Extraction::Empty => (None, String::new(), Metadata::new()),
    };

    if raw.is_redirect() {
        if let Some(location) = raw.location.as_deref().filter(|l| !l.trim().is_empty()) {
            metadata.insert(REDIRECT_LOCATION_KEY.to_string(), location.to_string());
        }
    }
    if !same_url(&request.url, &raw.final_url) {
        metadata.insert(FINAL_URL_KEY.to_string(), raw.final_url.clone());
    }

    FetchResult {
        url: request.url.clone(),
        title,
        word_count: count_words(&content),
        content,
        content_type: raw.content_type.clone(),
        status_code: raw.status_code,
        metadata,
    }
}

/// Build the analyze result from a HEAD outcome
///
/// Accessible means the HEAD call completed with a 2xx or 3xx status.
pub fn build_analyze_result(
    request: &AnalyzeRequest,
    outcome: Result<RawResponse, FetchError>,
) -> AnalyzeResult {
    match outcome {
        Ok(raw) => {
            let is_accessible = (200..400).contains(&raw.status_code);
            let error_message = (!is_accessible).then(|| {
                FetchError::UpstreamError {
                    status: raw.status_code,
                }
                .to_string()
            });
            AnalyzeResult {
                url: request.url.clone(),
                is_accessible,
                content_type: Some(raw.content_type).filter(|ct| !ct.is_empty()),
                content_length: raw.declared_content_length,
                status_code: Some(raw.status_code),
                error_message,
            }
        }
        Err(err) => AnalyzeResult {
            url: request.url.clone(),
            is_accessible: false,
            content_type: None,
            content_length: None,
            status_code: match err {
                FetchError::UpstreamError { status } => Some(status),
                _ => None,
            },
            error_message: Some(err.to_string()),
        },
    }
}

fn same_url(requested: &str, final_url: &str) -> bool {
    match (Url::parse(requested.trim()), Url::parse(final_url)) {
        (Ok(a), Ok(b)) => a == b,
        _ => requested.trim() == final_url,
    }
}
