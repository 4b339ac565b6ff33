// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::Parser;
use fabstir_url_access::{
    api::{start_server, ApiConfig, AppState},
    fetch::{FetchConfig, UrlAccessService},
    version,
};
use std::env;
use tokio::signal;
use tracing::info;

/// Fabstir URL access server
#[derive(Parser, Debug)]
#[command(name = "url-access-node")]
#[command(version = version::VERSION_NUMBER)]
#[command(about = "Bounded URL fetching and content extraction API", long_about = None)]
struct Args {
    /// Address to bind
    #[arg(long, env = "API_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "API_PORT")]
    port: Option<u16>,

    /// Comma-separated allowed CORS origins (`*` for any)
    #[arg(long, env = "CORS_ALLOWED_ORIGINS", value_delimiter = ',')]
    cors_origins: Option<Vec<String>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    info!("Starting {}", version::get_version_string());
    info!("BUILD VERSION: {}", version::VERSION);

    let fetch_config = FetchConfig::from_env();
    fetch_config
        .validate()
        .map_err(|e| anyhow!("invalid fetch configuration: {}", e))?;
    info!(
        max_content_bytes = fetch_config.max_content_bytes,
        max_redirects = fetch_config.max_redirects,
        connect_timeout_secs = fetch_config.connect_timeout_secs,
        truncate_oversized = fetch_config.truncate_oversized,
        "fetch configuration loaded"
    );

    let mut api_config = ApiConfig::from_env();
    if let Some(host) = args.host {
        api_config.host = host;
    }
    if let Some(port) = args.port {
        api_config.port = port;
    }
    if let Some(origins) = args.cors_origins.filter(|o| !o.is_empty()) {
        api_config.cors_allowed_origins = origins;
    }

    let service = UrlAccessService::new(fetch_config)?;
    let state = AppState::new(service, api_config);

    start_server(state, shutdown_signal()).await
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
