// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for bounded fetching
//!
//! Defines the byte cap, outbound identity, redirect and connect limits.

use std::env;

use super::types::MAX_CONTENT_BYTES;
use crate::version::DEFAULT_USER_AGENT;

/// Configuration for the bounded fetcher
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Maximum body bytes read per response (default: 10 MiB, cannot be raised)
    pub max_content_bytes: usize,
    /// User agent sent with every outbound request
    pub user_agent: String,
    /// Maximum redirects followed when redirects are enabled (default: 10)
    pub max_redirects: usize,
    /// Upper bound on connection establishment in seconds (default: 10)
    pub connect_timeout_secs: u64,
    /// Cut oversized bodies at the cap instead of failing (default: false)
    pub truncate_oversized: bool,
}

impl FetchConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_content_bytes: env::var("URL_ACCESS_MAX_CONTENT_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_content_bytes)
                .min(MAX_CONTENT_BYTES), // Never above the hard cap
            user_agent: env::var("URL_ACCESS_USER_AGENT")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.user_agent),
            max_redirects: env::var("URL_ACCESS_MAX_REDIRECTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_redirects),
            connect_timeout_secs: env::var("URL_ACCESS_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.connect_timeout_secs),
            truncate_oversized: env::var("URL_ACCESS_TRUNCATE_OVERSIZED")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.truncate_oversized),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.max_content_bytes == 0 {
            return Err("max_content_bytes must be at least 1".to_string());
        }
        if self.max_content_bytes > MAX_CONTENT_BYTES {
            return Err(format!(
                "max_content_bytes cannot exceed {} bytes",
                MAX_CONTENT_BYTES
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err("user_agent cannot be empty".to_string());
        }
        if self.max_redirects == 0 {
            return Err("max_redirects must be at least 1".to_string());
        }
        if self.connect_timeout_secs == 0 {
            return Err("connect_timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_content_bytes: MAX_CONTENT_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 10,
            connect_timeout_secs: 10,
            truncate_oversized: false,
        }
    }
}
