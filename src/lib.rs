// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod fetch;
pub mod version;

// Re-export main types
pub use api::{create_app, ApiConfig, ApiError, AppState};
pub use fetch::{
    AnalyzeRequest, AnalyzeResult, FetchConfig, FetchError, FetchRequest, FetchResult,
    UrlAccessService,
};
