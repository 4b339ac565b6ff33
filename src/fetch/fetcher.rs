// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bounded HTTP fetching
//!
//! Issues one GET or HEAD per call under a wall-clock deadline that spans
//! connect, headers and the whole body read. GET bodies are streamed through
//! [`CappedBody`] so an oversized transfer is aborted mid-flight.

use reqwest::header::{HeaderMap, ACCEPT, ACCEPT_LANGUAGE, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::body::{CappedBody, Overflow};
use super::config::FetchConfig;
use super::error::FetchError;
use super::types::{parse_http_url, AnalyzeRequest, FetchMethod, FetchRequest, RawResponse};

const ACCEPT_VALUE: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.5";

/// One outbound call
#[derive(Debug, Clone, Copy)]
pub struct FetchTarget<'a> {
    pub url: &'a str,
    pub method: FetchMethod,
    pub timeout: Duration,
    pub follow_redirects: bool,
}

impl<'a> From<&'a FetchRequest> for FetchTarget<'a> {
    fn from(request: &'a FetchRequest) -> Self {
        Self {
            url: &request.url,
            method: FetchMethod::Get,
            timeout: request.timeout(),
            follow_redirects: request.follow_redirects,
        }
    }
}

impl<'a> From<&'a AnalyzeRequest> for FetchTarget<'a> {
    fn from(request: &'a AnalyzeRequest) -> Self {
        Self {
            url: &request.url,
            method: FetchMethod::Head,
            timeout: request.timeout(),
            follow_redirects: true,
        }
    }
}

/// HTTP fetcher enforcing the deadline and byte cap
pub struct BoundedFetcher {
    following: Client,
    manual: Client,
    config: FetchConfig,
}

impl BoundedFetcher {
    /// Create a fetcher with pooled clients for both redirect modes
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let following = build_client(&config, Policy::limited(config.max_redirects))?;
        let manual = build_client(&config, Policy::none())?;
        Ok(Self {
            following,
            manual,
            config,
        })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Perform the call, failing with `Timeout` once the deadline passes
    pub async fn fetch(&self, target: FetchTarget<'_>) -> Result<RawResponse, FetchError> {
        let url = parse_http_url(target.url).map_err(|reason| FetchError::InvalidUrl { reason })?;
        let timeout_secs = target.timeout.as_secs();

        debug!(
            method = target.method.as_str(),
            url = %url,
            timeout_secs,
            follow_redirects = target.follow_redirects,
            "fetch.start"
        );

        match tokio::time::timeout(target.timeout, self.execute(url, target)).await {
            Ok(Ok(raw)) => Ok(raw),
            Ok(Err(FetchError::Timeout { .. })) | Err(_) => {
                warn!(url = target.url, timeout_secs, "fetch.timeout");
                Err(FetchError::Timeout { timeout_secs })
            }
            Ok(Err(err)) => {
                match &err {
                    FetchError::ConnectionFailed { reason } => {
                        warn!(url = target.url, reason = %reason, "fetch.connection_failed")
                    }
                    other => debug!(url = target.url, error = %other, "fetch.failed"),
                }
                Err(err)
            }
        }
    }

    /// Like [`fetch`](Self::fetch), aborting the call when `cancel` fires
    pub async fn fetch_cancellable(
        &self,
        target: FetchTarget<'_>,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, FetchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(url = target.url, "fetch.cancelled");
                Err(FetchError::Cancelled)
            }
            result = self.fetch(target) => result,
        }
    }

    async fn execute(&self, url: Url, target: FetchTarget<'_>) -> Result<RawResponse, FetchError> {
        let client = if target.follow_redirects {
            &self.following
        } else {
            &self.manual
        };

        let builder = match target.method {
            FetchMethod::Get => client
                .get(url)
                .header(ACCEPT, ACCEPT_VALUE)
                .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE),
            FetchMethod::Head => client.head(url),
        };
        let response = builder.timeout(target.timeout).send().await?;

        let status_code = response.status().as_u16();
        let headers = response.headers();
        let content_type = header_str(headers, CONTENT_TYPE.as_str())
            .unwrap_or_default()
            .to_string();
        let declared_content_length =
            header_str(headers, CONTENT_LENGTH.as_str()).and_then(parse_content_length);
        let location = header_str(headers, LOCATION.as_str()).map(str::to_string);
        let final_url = response.url().to_string();

        debug!(
            method = target.method.as_str(),
            status = status_code,
            content_type = %content_type,
            declared_content_length = ?declared_content_length,
            "fetch.headers"
        );

        let mut raw = RawResponse {
            status_code,
            content_type,
            declared_content_length,
            location,
            body: Vec::new(),
            truncated: false,
            final_url,
        };

        if target.method == FetchMethod::Head {
            return Ok(raw);
        }

        if status_code >= 400 {
            return Err(FetchError::UpstreamError {
                status: status_code,
            });
        }

        let limit = self.config.max_content_bytes;
        let overflow = if self.config.truncate_oversized {
            Overflow::Truncate
        } else {
            Overflow::Fail
        };

        if overflow == Overflow::Fail {
            if let Some(declared) = declared_content_length {
                if declared > limit as u64 {
                    warn!(declared, limit, "fetch.too_large, declared length over cap");
                    return Err(FetchError::TooLarge { limit });
                }
            }
        }

        let capped = CappedBody::new(Box::pin(response.bytes_stream()), limit, overflow);
        let (body, truncated) = capped.collect_bytes().await.map_err(|err| {
            if let FetchError::TooLarge { .. } = err {
                warn!(limit, "fetch.too_large, body aborted at cap");
            }
            err
        })?;

        if truncated {
            info!(limit, "fetch.truncated");
        }
        debug!(bytes = body.len(), truncated, "fetch.body_complete");

        raw.body = body;
        raw.truncated = truncated;
        Ok(raw)
    }
}

fn build_client(config: &FetchConfig, policy: Policy) -> Result<Client, FetchError> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(policy)
        .build()
        .map_err(|e| FetchError::internal(format!("failed to create HTTP client: {}", e)))
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Parse a `Content-Length` value, accepting only ASCII digits
fn parse_content_length(value: &str) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
