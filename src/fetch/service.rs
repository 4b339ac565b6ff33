// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! URL access service
//!
//! Runs the per-request pipeline: fetch → classify → extract → assemble.
//! Holds no per-request state; clones share the pooled HTTP clients.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::assembler::{build_analyze_result, build_fetch_result, Extraction};
use super::classifier::{self, ContentKind};
use super::config::FetchConfig;
use super::error::FetchError;
use super::extractor::{decode_body, HtmlExtractor};
use super::fetcher::{BoundedFetcher, FetchTarget};
use super::json::format_json;
use super::types::{AnalyzeRequest, AnalyzeResult, FetchRequest, FetchResult, RawResponse};

/// Fetch and analyze pipelines over a shared fetcher
#[derive(Clone)]
pub struct UrlAccessService {
    fetcher: Arc<BoundedFetcher>,
}

impl UrlAccessService {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        Ok(Self {
            fetcher: Arc::new(BoundedFetcher::new(config)?),
        })
    }

    pub fn config(&self) -> &FetchConfig {
        self.fetcher.config()
    }

    /// Fetch a URL and extract its content
    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, FetchError> {
        self.fetch_cancellable(request, &CancellationToken::new())
            .await
    }

    /// Fetch a URL, aborting when `cancel` fires
    pub async fn fetch_cancellable(
        &self,
        request: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<FetchResult, FetchError> {
        let raw = self
            .fetcher
            .fetch_cancellable(FetchTarget::from(request), cancel)
            .await?;

        let kind = classifier::classify(&raw.content_type);
        let extract_text = request.extract_text;

        // Parsing a capped body is CPU-bound; keep it off the async workers
        let (raw, extraction) = tokio::select! {
            joined = tokio::task::spawn_blocking(move || {
                let extraction = extract(kind, &raw, extract_text);
                (raw, extraction)
            }) => {
                joined.map_err(|e| FetchError::internal(format!("extraction task failed: {}", e)))?
            }
            _ = cancel.cancelled() => {
                info!(url = %request.url, "fetch.cancelled during extraction");
                return Err(FetchError::Cancelled);
            }
        };
        let extraction = extraction.map_err(|err| {
            warn!(url = %request.url, kind = ?kind, error = %err, "fetch.extract_failed");
            err
        })?;
        let result = build_fetch_result(request, &raw, extraction);

        info!(
            url = %request.url,
            status = result.status_code,
            kind = ?kind,
            bytes = raw.body.len(),
            word_count = result.word_count,
            "fetch.complete"
        );
        Ok(result)
    }

    /// Check accessibility with a HEAD request. Never fails; problems are
    /// reported through `is_accessible` and `error_message`.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> AnalyzeResult {
        self.analyze_cancellable(request, &CancellationToken::new())
            .await
    }

    pub async fn analyze_cancellable(
        &self,
        request: &AnalyzeRequest,
        cancel: &CancellationToken,
    ) -> AnalyzeResult {
        let outcome = self
            .fetcher
            .fetch_cancellable(FetchTarget::from(request), cancel)
            .await;
        let result = build_analyze_result(request, outcome);

        info!(
            url = %request.url,
            accessible = result.is_accessible,
            status = ?result.status_code,
            "analyze.complete"
        );
        result
    }
}

/// Run the extractor that matches `kind`
fn extract(kind: ContentKind, raw: &RawResponse, extract_text: bool) -> Result<Extraction, FetchError> {
    let charset = classifier::charset(&raw.content_type);
    match kind {
        ContentKind::Html => HtmlExtractor::new(extract_text)
            .extract(&raw.body, charset.as_deref())
            .map(Extraction::Html),
        ContentKind::Json => format_json(&raw.body).map(Extraction::Json),
        ContentKind::PlainText => decode_body(&raw.body, charset.as_deref()).map(Extraction::Text),
        ContentKind::Other => Ok(Extraction::Empty),
    }
}
