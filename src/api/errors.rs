// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::fetch::FetchError;

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
    pub error_type: String,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    NotFound(String),
    /// Query parameters failed to bind or validate
    ValidationError(String),
    Fetch(FetchError),
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let (error_type, detail) = match self {
            ApiError::NotFound(msg) => ("not_found", msg.clone()),
            ApiError::ValidationError(msg) => ("validation_error", msg.clone()),
            ApiError::Fetch(err) => (err.error_type(), err.to_string()),
            ApiError::InternalError(_) => ("internal_error", "An internal error occurred".to_string()),
        };

        ErrorResponse {
            detail,
            error_type: error_type.to_string(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::ValidationError(_) => 422,
            ApiError::Fetch(err) => err.status_code(),
            ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Fetch(err) => write!(f, "{}", err),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        ApiError::Fetch(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self, "api.error");
        }
        (status, Json(self.to_response())).into_response()
    }
}
