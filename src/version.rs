// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the URL access service

/// Full version string with feature description
pub const VERSION: &str = "v1.0.0-bounded-fetch-2025-11-02";

/// Semantic version number
pub const VERSION_NUMBER: &str = "1.0.0";

/// Build date
pub const BUILD_DATE: &str = "2025-11-02";

/// Service name reported by `/health`
pub const SERVICE_NAME: &str = "url-access-api";

/// Default outbound user agent (identifies the tool for polite crawling)
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; FabstirUrlAccess/1.0; +https://fabstir.com/bot)";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "bounded-fetch",
    "streaming-size-cap",
    "wall-clock-timeout",
    "html-text-extraction",
    "open-graph-metadata",
    "json-pretty-print",
    "head-analysis",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Fabstir URL Access {} ({})", VERSION_NUMBER, BUILD_DATE)
}
