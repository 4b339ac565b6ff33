// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bounded URL fetching and content extraction
//!
//! Fetches a caller-supplied URL under a wall-clock deadline and a hard byte
//! cap, then turns the body into a normalized [`FetchResult`]. The analyze
//! pipeline only issues a HEAD request and reports accessibility in-band.
//!
//! ## Architecture
//!
//! ```text
//! FetchRequest → BoundedFetcher (deadline + CappedBody) → RawResponse
//!                                                            ↓
//!                                                     classify(content-type)
//!                                ↓                ↓                 ↓             ↓
//!                          HtmlExtractor     format_json      decode_body      (empty)
//!                                └────────────────┴─────────────────┴─────────────┘
//!                                                            ↓
//!                                                   build_fetch_result → FetchResult
//!
//! AnalyzeRequest → BoundedFetcher (HEAD) → build_analyze_result → AnalyzeResult
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let service = UrlAccessService::new(FetchConfig::from_env())?;
//!
//! let result = service.fetch(&FetchRequest::new("https://example.com")).await?;
//! println!("{:?}: {} words", result.title, result.word_count);
//!
//! let analysis = service.analyze(&AnalyzeRequest::new("https://example.com")).await;
//! ```

pub mod assembler;
pub mod body;
pub mod classifier;
pub mod config;
pub mod dom;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod json;
pub mod meta;
pub mod service;
pub mod types;

pub use classifier::{classify, ContentKind};
pub use config::FetchConfig;
pub use error::FetchError;
pub use extractor::HtmlExtractor;
pub use fetcher::{BoundedFetcher, FetchTarget};
pub use json::{format_json, FormattedJson};
pub use service::UrlAccessService;
pub use types::{
    AnalyzeRequest, AnalyzeResult, ExtractedContent, FetchMethod, FetchRequest, FetchResult,
    RawResponse, MAX_CONTENT_BYTES,
};
