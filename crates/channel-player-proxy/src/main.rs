//! Channel Player Proxy - caching proxy for a streaming video player
//!
//! Serves the player's app shell cache-first from an install-time seed
//! and applies a bounded, FIFO-evicted cache-first policy to HLS
//! manifests and segments.

mod error;
mod fetcher;
mod lifecycle;
mod policy;
mod server;
#[cfg(test)]
mod testutil;
mod types;

use crate::error::{ProxyError, Result};
use crate::fetcher::UpstreamFetcher;
use crate::server::{start_server, ServerState, SharedState};
use crate::types::ProxyConfig;
use response_store::StoreRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};
use url::Url;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("channel_player_proxy=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting Channel Player Proxy...");

    // Load configuration from environment
    let config = load_config()?;
    info!("Port: {}", config.port);
    info!("Cache dir: {:?}", config.cache_dir);
    info!("Upstream: {}", config.upstream_url);
    info!("Cache name: {}", config.cache_name);
    info!("Max media entries: {}", config.max_media_entries);

    let registry = StoreRegistry::new(config.cache_dir.clone());
    registry.init().await?;

    let fetcher = UpstreamFetcher::new(config.upstream_url.clone());

    // Install must fully succeed before this version takes over; a
    // failed shell seed aborts startup and the previous deployment
    // keeps serving.
    lifecycle::install(&registry, &fetcher, &config).await?;
    let store = lifecycle::activate(&registry, &config).await?;

    // Create shared state
    let port = config.port;
    let state: SharedState = Arc::new(ServerState::new(store, fetcher, config));

    // Start HTTP server (blocking)
    start_server(state, port).await?;

    Ok(())
}

fn load_config() -> Result<ProxyConfig> {
    let defaults = ProxyConfig::default();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(defaults.port);

    let cache_dir = std::env::var("CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| defaults.cache_dir.clone());

    let upstream_url = match std::env::var("UPSTREAM_URL") {
        Ok(s) => {
            Url::parse(&s).map_err(|e| ProxyError::Config(format!("Bad UPSTREAM_URL: {}", e)))?
        }
        Err(_) => defaults.upstream_url.clone(),
    };

    let max_media_entries = std::env::var("MAX_MEDIA_ENTRIES")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(defaults.max_media_entries);

    Ok(ProxyConfig {
        port,
        cache_dir,
        upstream_url,
        max_media_entries,
        ..defaults
    })
}
