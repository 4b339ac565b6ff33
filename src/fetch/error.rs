// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fetch error taxonomy
//!
//! Every failure inside the fetcher, extractor and formatter is converted to
//! a [`FetchError`] at its boundary. The `Display` text of each variant is a
//! stable summary safe to show to callers; transport detail is kept in the
//! `reason` fields and only logged.

use thiserror::Error;

/// Status used when the caller abandoned the request (nginx convention)
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Errors that can occur while fetching and extracting a URL
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// URL is not an absolute http(s) URL
    #[error("Invalid URL: {reason}")]
    InvalidUrl { reason: String },

    /// Connect + read did not finish within the request deadline
    #[error("Request timeout")]
    Timeout { timeout_secs: u64 },

    /// Body exceeded the byte cap
    #[error("Content too large (max {}MB)", .limit / (1024 * 1024))]
    TooLarge { limit: usize },

    /// DNS, connect, TLS or protocol failure
    #[error("Unable to connect to the URL")]
    ConnectionFailed { reason: String },

    /// Body could not be decoded as text
    #[error("Unable to decode content as text")]
    DecodeFailed { reason: String },

    /// Upstream answered with an error status
    #[error("HTTP error: {status}{}", status_reason(.status))]
    UpstreamError { status: u16 },

    /// Caller cancelled the request before it finished
    #[error("Request cancelled")]
    Cancelled,

    /// Unclassified internal fault
    #[error("An internal error occurred")]
    Internal { reason: String },
}

fn status_reason(status: &u16) -> String {
    reqwest::StatusCode::from_u16(*status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map(|r| format!(" {}", r))
        .unwrap_or_default()
}

impl FetchError {
    pub fn connection(reason: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            reason: reason.into(),
        }
    }

    pub fn decode(reason: impl Into<String>) -> Self {
        Self::DecodeFailed {
            reason: reason.into(),
        }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }

    /// External status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            FetchError::Timeout { .. } => 408,
            FetchError::TooLarge { .. } => 413,
            FetchError::InvalidUrl { .. } | FetchError::DecodeFailed { .. } => 422,
            FetchError::ConnectionFailed { .. } => 503,
            FetchError::UpstreamError { status } if *status >= 400 => *status,
            FetchError::UpstreamError { .. } => 502,
            FetchError::Cancelled => CLIENT_CLOSED_REQUEST,
            FetchError::Internal { .. } => 500,
        }
    }

    /// Short machine-readable code
    pub fn error_type(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl { .. } => "invalid_url",
            FetchError::Timeout { .. } => "timeout",
            FetchError::TooLarge { .. } => "too_large",
            FetchError::ConnectionFailed { .. } => "connection_failed",
            FetchError::DecodeFailed { .. } => "decode_failed",
            FetchError::UpstreamError { .. } => "upstream_error",
            FetchError::Cancelled => "cancelled",
            FetchError::Internal { .. } => "internal_error",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // The deadline is tracked by the caller; seconds are filled in there
            return FetchError::Timeout { timeout_secs: 0 };
        }
        if err.is_builder() {
            return FetchError::InvalidUrl {
                reason: err.to_string(),
            };
        }
        // connect, TLS, redirect, body and decode failures
        FetchError::ConnectionFailed {
            reason: err.to_string(),
        }
    }
}
