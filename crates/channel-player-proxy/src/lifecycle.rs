//! Install and activate transitions for the cache store

use crate::error::{ProxyError, Result};
use crate::fetcher::UpstreamFetcher;
use crate::types::ProxyConfig;
use response_store::{ResponseStore, StoreRegistry};
use tracing::{info, warn};

/// Install: open the current version's store and seed the app shell.
///
/// All-or-nothing: every shell asset is fetched before anything is
/// committed, so a single unreachable asset fails the whole install
/// and leaves no partial shell behind. No retry here; the caller's
/// supervisor decides whether to try again.
pub async fn install(
    registry: &StoreRegistry,
    fetcher: &UpstreamFetcher,
    config: &ProxyConfig,
) -> Result<ResponseStore> {
    let store = registry.open(&config.cache_name).await?;
    info!(
        cache = %config.cache_name,
        assets = config.shell_assets.len(),
        "Installing: seeding app shell"
    );

    let mut fetched = Vec::with_capacity(config.shell_assets.len());
    for asset in &config.shell_assets {
        let snapshot = fetcher.fetch(asset).await.map_err(|e| {
            ProxyError::Install(format!("shell asset {} unreachable: {}", asset, e))
        })?;
        fetched.push((asset.as_str(), snapshot));
    }

    for (asset, snapshot) in &fetched {
        store.put(asset, snapshot).await?;
    }

    info!(cache = %config.cache_name, "Install complete");
    Ok(store)
}

/// Activate: delete every store from a previous version and hand back
/// the current store for all request handling from here on.
///
/// Deletion is best-effort: a store that fails to delete is logged and
/// skipped, so a stale version can never block the new one from taking
/// over.
pub async fn activate(registry: &StoreRegistry, config: &ProxyConfig) -> Result<ResponseStore> {
    for name in registry.list().await? {
        if name == config.cache_name {
            continue;
        }
        match registry.delete(&name).await {
            Ok(()) => info!(name = %name, "Deleted old cache store"),
            Err(e) => warn!(name = %name, error = %e, "Failed to delete old cache store"),
        }
    }

    let store = registry.open(&config.cache_name).await?;
    info!(cache = %config.cache_name, "Activated");
    Ok(store)
}
