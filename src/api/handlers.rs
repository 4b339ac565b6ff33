// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Endpoint handlers
//!
//! Handlers only bind and validate query parameters, call the service and
//! render its result. A dropped handler future (client disconnect) cancels
//! the in-flight outbound request through a drop guard.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::errors::ApiError;
use super::http_server::AppState;
use crate::fetch::types::{DEFAULT_ANALYZE_TIMEOUT_SECS, DEFAULT_FETCH_TIMEOUT_SECS};
use crate::fetch::{AnalyzeRequest, AnalyzeResult, FetchRequest, FetchResult};
use crate::version;

fn default_true() -> bool {
    true
}

fn default_fetch_timeout() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

fn default_analyze_timeout() -> u64 {
    DEFAULT_ANALYZE_TIMEOUT_SECS
}

/// Query parameters of `GET /fetch`
#[derive(Debug, Clone, Deserialize)]
pub struct FetchQuery {
    pub url: String,
    #[serde(default = "default_true")]
    pub extract_text: bool,
    #[serde(default = "default_true")]
    pub follow_redirects: bool,
    #[serde(default = "default_fetch_timeout")]
    pub timeout: u64,
}

impl From<FetchQuery> for FetchRequest {
    fn from(query: FetchQuery) -> Self {
        FetchRequest::new(query.url)
            .with_extract_text(query.extract_text)
            .with_follow_redirects(query.follow_redirects)
            .with_timeout_seconds(query.timeout)
    }
}

/// Query parameters of `GET /analyze`
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeQuery {
    pub url: String,
    #[serde(default = "default_analyze_timeout")]
    pub timeout: u64,
}

impl From<AnalyzeQuery> for AnalyzeRequest {
    fn from(query: AnalyzeQuery) -> Self {
        AnalyzeRequest::new(query.url).with_timeout_seconds(query.timeout)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

fn bind<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query.map(|Query(q)| q).map_err(|rejection| {
        let message = rejection.body_text();
        debug!(error = %message, "api.query_rejected");
        ApiError::ValidationError(message)
    })
}

/// GET /fetch - Fetch a URL and extract its content
///
/// # Errors
/// - 422: invalid parameters, invalid URL or undecodable body
/// - 408: deadline exceeded
/// - 413: body over the byte cap
/// - 503: connection failure
/// - upstream status (>= 400) passed through
pub async fn fetch_handler(
    State(state): State<AppState>,
    query: Result<Query<FetchQuery>, QueryRejection>,
) -> Result<Json<FetchResult>, ApiError> {
    let request = FetchRequest::from(bind(query)?);
    if let Err(e) = request.validate() {
        warn!(url = %request.url, error = %e, "fetch validation failed");
        return Err(ApiError::ValidationError(e));
    }

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let result = state.service.fetch_cancellable(&request, &cancel).await?;
    Ok(Json(result))
}

/// GET /analyze - HEAD-only accessibility check
///
/// Always 200 once the parameters validate; inaccessibility is reported in
/// the body.
pub async fn analyze_handler(
    State(state): State<AppState>,
    query: Result<Query<AnalyzeQuery>, QueryRejection>,
) -> Result<Json<AnalyzeResult>, ApiError> {
    let request = AnalyzeRequest::from(bind(query)?);
    if let Err(e) = request.validate() {
        warn!(url = %request.url, error = %e, "analyze validation failed");
        return Err(ApiError::ValidationError(e));
    }

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    Ok(Json(state.service.analyze_cancellable(&request, &cancel).await))
}

/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: version::SERVICE_NAME.to_string(),
        version: version::VERSION_NUMBER.to_string(),
    })
}

pub async fn not_found_handler() -> ApiError {
    ApiError::NotFound("no such endpoint".to_string())
}
