//! Core types for the channel player proxy

use response_store::StoreStats;
use serde::Serialize;
use std::path::PathBuf;
use url::Url;

/// Configuration for the proxy
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub port: u16,
    /// Root directory for the store registry
    pub cache_dir: PathBuf,
    /// Origin that relative request paths resolve against
    pub upstream_url: Url,
    /// Name of the current cache version's store
    pub cache_name: String,
    /// Ceiling on the number of media entries (manifests + segments)
    pub max_media_entries: usize,
    /// Baseline application files seeded at install time.
    ///
    /// Absolute URLs (the CDN player bundles) are fetched cross-origin
    /// and cached under their full URL. The HTTP surface only forwards
    /// path-shaped targets, so those entries are a warm offline copy,
    /// not a servable route.
    pub shell_assets: Vec<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: 3002,
            cache_dir: PathBuf::from("./cache/player"),
            upstream_url: Url::parse("http://localhost:8000").expect("static URL"),
            cache_name: "channel-player-cache-v1".to_string(),
            max_media_entries: 200,
            shell_assets: vec![
                "/".to_string(),
                "/index.html".to_string(),
                "https://cdn.jsdelivr.net/npm/hls.js@latest".to_string(),
                "https://cdn.jsdelivr.net/npm/mpegts.js/dist/mpegts.min.js".to_string(),
            ],
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache: StoreStats,
}
