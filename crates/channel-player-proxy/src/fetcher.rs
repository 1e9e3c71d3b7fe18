//! Upstream network fetching

use crate::error::{ProxyError, Result};
use reqwest::Client;
use response_store::StoredResponse;
use tracing::debug;
use url::Url;

/// HTTP client that snapshots upstream responses.
///
/// Only transport-level failures are errors; a non-2xx status is data,
/// carried through on the snapshot exactly as the upstream returned it.
pub struct UpstreamFetcher {
    client: Client,
    base: Url,
}

impl UpstreamFetcher {
    /// Create a fetcher resolving relative paths against `base`
    pub fn new(base: Url) -> Self {
        Self {
            client: Client::new(),
            base,
        }
    }

    /// Resolve a request target against the upstream origin.
    ///
    /// Absolute URLs (cross-origin shell assets such as CDN bundles)
    /// pass through unchanged.
    pub fn resolve(&self, target: &str) -> Result<Url> {
        self.base
            .join(target)
            .map_err(|e| ProxyError::Config(format!("Unresolvable URL {}: {}", target, e)))
    }

    /// Fetch a resource and snapshot status, content type, and body
    pub async fn fetch(&self, target: &str) -> Result<StoredResponse> {
        let url = self.resolve(target)?;
        debug!(url = %url, "Fetching from upstream");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let body = response.bytes().await?.to_vec();

        debug!(
            url = %url,
            status,
            size = body.len(),
            content_type = %content_type,
            "Fetched upstream response"
        );

        Ok(StoredResponse {
            status,
            content_type,
            body,
        })
    }
}
