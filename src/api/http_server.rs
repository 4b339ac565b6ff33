// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{http::HeaderValue, routing::get, Router};
use std::future::Future;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::handlers::{analyze_handler, fetch_handler, health_handler, not_found_handler};
use super::server::ApiConfig;
use crate::fetch::UrlAccessService;

#[derive(Clone)]
pub struct AppState {
    pub service: UrlAccessService,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(service: UrlAccessService, config: ApiConfig) -> Self {
        Self { service, config }
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health_handler))
        .route("/fetch", get(fetch_handler))
        .route("/analyze", get(analyze_handler))
        .fallback(not_found_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Serve the API until `shutdown` resolves
pub async fn start_server<F>(state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = state.config.listen_addr();
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("API server stopped");
    Ok(())
}
