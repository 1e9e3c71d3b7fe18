//! Request routing and cache policies
//!
//! Every intercepted request goes through [`handle_request`], which
//! branches once on the URL suffix: HLS manifests (`.m3u8`) and
//! segments (`.ts`) get the bounded write-through policy, everything
//! else gets plain cache-first against the install-time shell.

use crate::error::Result;
use crate::fetcher::UpstreamFetcher;
use crate::types::ProxyConfig;
use response_store::{ResponseStore, StoredResponse};
use tracing::{debug, warn};
use url::Url;

/// How a response was produced, for the `X-Cache` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

impl CacheOutcome {
    pub fn as_header(&self) -> &'static str {
        match self {
            CacheOutcome::Hit => "HIT",
            CacheOutcome::Miss => "MISS",
        }
    }
}

/// Case-sensitive, exact suffix test on a URL path.
///
/// Suffix matching, not MIME inspection. This is the only branch in
/// the system.
fn has_media_suffix(path: &str) -> bool {
    path.ends_with(".m3u8") || path.ends_with(".ts")
}

/// Whether a parsed URL names a streaming manifest or segment
pub fn is_media_url(url: &Url) -> bool {
    has_media_suffix(url.path())
}

/// Suffix test on a raw store key (query and fragment excluded)
fn is_media_key(key: &str) -> bool {
    let path = key.split(['?', '#']).next().unwrap_or(key);
    has_media_suffix(path)
}

/// Intercept one request: route by suffix and produce a response
pub async fn handle_request(
    store: &ResponseStore,
    fetcher: &UpstreamFetcher,
    config: &ProxyConfig,
    target: &str,
) -> Result<(StoredResponse, CacheOutcome)> {
    let url = fetcher.resolve(target)?;
    if is_media_url(&url) {
        segment_request(store, fetcher, config, target).await
    } else {
        shell_request(store, fetcher, target).await
    }
}

/// Cache-first, write-through, bounded.
///
/// A hit is served with no network call and no freshness check. That
/// treats a live `.m3u8` that updates in place exactly like an
/// immutable segment, so it can be served stale forever (see
/// DESIGN.md).
async fn segment_request(
    store: &ResponseStore,
    fetcher: &UpstreamFetcher,
    config: &ProxyConfig,
    target: &str,
) -> Result<(StoredResponse, CacheOutcome)> {
    if let Some(cached) = store.get(target).await {
        return Ok((cached, CacheOutcome::Hit));
    }

    // Whatever the transport returned is the result, cached as-is;
    // only transport failures propagate as errors.
    let snapshot = fetcher.fetch(target).await?;
    store.put(target, &snapshot).await?;

    enforce_media_bound(store, config.max_media_entries).await;

    Ok((snapshot, CacheOutcome::Miss))
}

/// Plain cache-first. Never writes: shell entries are populated only
/// at install time, so an unlisted asset goes to network every time.
async fn shell_request(
    store: &ResponseStore,
    fetcher: &UpstreamFetcher,
    target: &str,
) -> Result<(StoredResponse, CacheOutcome)> {
    if let Some(cached) = store.get(target).await {
        return Ok((cached, CacheOutcome::Hit));
    }

    let snapshot = fetcher.fetch(target).await?;
    Ok((snapshot, CacheOutcome::Miss))
}

/// Number of entries currently counted against the media bound
pub async fn media_entry_count(store: &ResponseStore) -> usize {
    store
        .keys()
        .await
        .iter()
        .filter(|k| is_media_key(k))
        .count()
}

/// Trim media entries down to `max`, oldest insertion first.
///
/// Shell entries are excluded from the count and from candidacy.
/// Strict FIFO, no LRU and no TTL. Best-effort: a failed delete stops
/// the trim for this request and the store stays transiently over
/// bound until the next write-triggered trim.
pub async fn enforce_media_bound(store: &ResponseStore, max: usize) {
    let media: Vec<String> = store
        .keys()
        .await
        .into_iter()
        .filter(|k| is_media_key(k))
        .collect();

    if media.len() <= max {
        return;
    }

    let excess = media.len() - max;
    for key in media.into_iter().take(excess) {
        match store.delete(&key).await {
            Ok(_) => debug!(url = %key, "Evicted oldest media entry"),
            Err(e) => {
                warn!(url = %key, error = %e, "Failed to evict media entry, stopping trim");
                break;
            }
        }
    }
}
