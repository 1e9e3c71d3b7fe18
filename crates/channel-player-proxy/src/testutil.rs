//! Throwaway upstream servers for tests

use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use url::Url;

/// A local upstream that answers every path with a 200 body of
/// `upstream:<path>` and counts the requests it receives.
pub struct TestUpstream {
    pub url: Url,
    hits: Arc<AtomicUsize>,
}

impl TestUpstream {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let router = Router::new().fallback(serve_path).with_state(hits.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            url: Url::parse(&format!("http://{}", addr)).unwrap(),
            hits,
        }
    }

    /// Total requests served so far
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn serve_path(State(hits): State<Arc<AtomicUsize>>, uri: Uri) -> impl IntoResponse {
    hits.fetch_add(1, Ordering::SeqCst);
    // Paths under /missing answer 404 so tests can observe non-2xx flows
    let status = if uri.path().starts_with("/missing") {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    (
        status,
        [(header::CONTENT_TYPE, "application/octet-stream")],
        format!("upstream:{}", uri.path()),
    )
}

/// Whether read-only permission bits are enforced for this process.
///
/// Root bypasses them, which disables failure injection via chmod;
/// tests relying on it bail out early in that case.
#[cfg(unix)]
pub fn permissions_enforced(dir: &std::path::Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("readonly-check");
    std::fs::write(&path, b"x").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o444)).unwrap();
    std::fs::write(&path, b"y").is_err()
}

/// A URL that nothing is listening on, for transport-failure tests
pub async fn unreachable_upstream() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}", addr)).unwrap()
}
