//! HTTP server for the caching proxy
//!
//! Provides /health plus a fallback route that funnels every other
//! request through the interceptor, so the cache policies see every
//! outgoing request the player makes.

use crate::fetcher::UpstreamFetcher;
use crate::policy::{handle_request, media_entry_count};
use crate::types::{HealthResponse, ProxyConfig};
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use response_store::ResponseStore;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Shared state for the HTTP server
pub struct ServerState {
    pub store: ResponseStore,
    pub fetcher: UpstreamFetcher,
    pub config: ProxyConfig,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(store: ResponseStore, fetcher: UpstreamFetcher, config: ProxyConfig) -> Self {
        Self {
            store,
            fetcher,
            config,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .fallback(proxy_request)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let mut cache_stats = state.store.stats().await;
    cache_stats.media_entries = media_entry_count(&state.store).await;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        cache: cache_stats,
    })
}

/// Intercept any other request and answer it through the cache policies
async fn proxy_request(State(state): State<SharedState>, uri: Uri) -> Response {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path())
        .to_string();

    match handle_request(&state.store, &state.fetcher, &state.config, &target).await {
        Ok((snapshot, outcome)) => Response::builder()
            .status(StatusCode::from_u16(snapshot.status).unwrap_or(StatusCode::OK))
            .header(header::CONTENT_TYPE, snapshot.content_type)
            .header("X-Cache", outcome.as_header())
            .body(Body::from(snapshot.body))
            .unwrap(),
        Err(e) => {
            // The hosting page just sees its request fail; nothing is
            // cached on this path.
            warn!(target = %target, error = %e, "Failed to answer intercepted request");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: "Upstream fetch failed".to_string(),
                }),
            )
                .into_response()
        }
    }
}
