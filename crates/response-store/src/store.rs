//! File-backed response storage with in-memory metadata

use crate::error::Result;
use crate::types::{EntryMeta, StoreStats, StoredResponse};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

const INDEX_FILE: &str = "index.json";

/// A response store with in-memory metadata and file-based bodies.
///
/// Keys are request URLs. Each entry records an insertion sequence
/// number, so "oldest entry" is an explicit property of the store
/// rather than an artifact of iteration order. Individual calls are
/// atomic; there is no transaction spanning multiple calls.
pub struct ResponseStore {
    /// In-memory metadata for stored entries
    entries: Arc<RwLock<HashMap<String, EntryMeta>>>,
    /// Directory where bodies and the metadata index live
    dir: PathBuf,
    /// Next insertion sequence number
    next_seq: AtomicU64,
    /// Current total size of stored bodies
    total_size: AtomicU64,
    /// Lookup hit counter
    hits: AtomicU64,
    /// Lookup miss counter
    misses: AtomicU64,
}

impl ResponseStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// Reloads the persisted metadata index when one exists, so entries
    /// survive restarts of the owning process.
    pub async fn open(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;

        let index_path = dir.join(INDEX_FILE);
        let entries: HashMap<String, EntryMeta> = match fs::read(&index_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(_) => HashMap::new(),
        };

        let next_seq = entries.values().map(|e| e.seq + 1).max().unwrap_or(0);
        let total_size = entries.values().map(|e| e.size).sum();

        debug!(dir = ?dir, entries = entries.len(), "Opened response store");

        Ok(Self {
            entries: Arc::new(RwLock::new(entries)),
            dir,
            next_seq: AtomicU64::new(next_seq),
            total_size: AtomicU64::new(total_size),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Generate the on-disk body filename for a request URL
    pub fn entry_key(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Look up a stored response by request URL
    pub async fn get(&self, url: &str) -> Option<StoredResponse> {
        let meta = {
            let entries = self.entries.read().await;
            entries.get(url).cloned()
        };

        if let Some(meta) = meta {
            match fs::read(&meta.path).await {
                Ok(body) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(url = %url, "Store hit");
                    return Some(StoredResponse {
                        status: meta.status,
                        content_type: meta.content_type,
                        body,
                    });
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Failed to read stored body, removing entry");
                    let _ = self.delete(url).await;
                }
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a response keyed by request URL.
    ///
    /// Overwriting an existing entry assigns a fresh insertion sequence
    /// number: insertion order reflects recency of insertion/overwrite.
    pub async fn put(&self, url: &str, response: &StoredResponse) -> Result<()> {
        let size = response.body.len() as u64;
        let path = self.dir.join(Self::entry_key(url));
        fs::write(&path, &response.body).await?;

        let meta = EntryMeta {
            path,
            status: response.status,
            content_type: response.content_type.clone(),
            size,
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            inserted_at: Utc::now(),
        };

        // The index is persisted while the write lock is still held so
        // concurrent puts cannot land their snapshots out of order: a
        // put that returned Ok is in index.json.
        let mut entries = self.entries.write().await;
        if let Some(old) = entries.insert(url.to_string(), meta) {
            self.total_size.fetch_sub(old.size, Ordering::Relaxed);
        }
        self.total_size.fetch_add(size, Ordering::Relaxed);
        self.persist_index(&entries).await?;
        drop(entries);

        debug!(url = %url, size, "Stored response");
        Ok(())
    }

    /// Remove an entry. Returns whether the key was present.
    pub async fn delete(&self, url: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        let Some(meta) = entries.remove(url) else {
            return Ok(false);
        };
        self.total_size.fetch_sub(meta.size, Ordering::Relaxed);
        self.persist_index(&entries).await?;
        drop(entries);

        // Body removal is best-effort; a leftover file is unreachable
        // once its metadata is gone.
        let _ = fs::remove_file(&meta.path).await;

        Ok(true)
    }

    /// All keys in insertion order, oldest first
    pub async fn keys(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut keyed: Vec<(u64, String)> =
            entries.iter().map(|(k, m)| (m.seq, k.clone())).collect();
        keyed.sort_unstable_by_key(|(seq, _)| *seq);
        keyed.into_iter().map(|(_, k)| k).collect()
    }

    /// Whether a key is present, without touching hit/miss counters
    pub async fn contains(&self, url: &str) -> bool {
        let entries = self.entries.read().await;
        entries.contains_key(url)
    }

    /// Current store statistics
    pub async fn stats(&self) -> StoreStats {
        let entries = self.entries.read().await;
        StoreStats {
            entries: entries.len(),
            // Filled in by the layer that knows the media suffixes
            media_entries: 0,
            total_size: self.total_size.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    async fn persist_index(&self, entries: &HashMap<String, EntryMeta>) -> Result<()> {
        let bytes = serde_json::to_vec(entries)?;
        fs::write(self.dir.join(INDEX_FILE), bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn response(body: &[u8]) -> StoredResponse {
        StoredResponse {
            status: 200,
            content_type: "video/mp2t".to_string(),
            body: body.to_vec(),
        }
    }

    #[test]
    fn test_entry_key_generation() {
        let key1 = ResponseStore::entry_key("https://cdn.example/seg1.ts");
        let key2 = ResponseStore::entry_key("https://cdn.example/seg1.ts");
        let key3 = ResponseStore::entry_key("https://cdn.example/seg2.ts");

        // Same inputs produce same key
        assert_eq!(key1, key2);
        assert_ne!(key1, key3);

        // Keys are hex strings (64 chars for SHA256)
        assert_eq!(key1.len(), 64);
        assert!(key1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let dir = tempdir().unwrap();
        let store = ResponseStore::open(dir.path().to_path_buf()).await.unwrap();

        let stored = response(b"segment bytes");
        store.put("/video/seg1.ts", &stored).await.unwrap();

        let got = store.get("/video/seg1.ts").await.unwrap();
        assert_eq!(got, stored);
    }

    #[tokio::test]
    async fn test_get_miss() {
        let dir = tempdir().unwrap();
        let store = ResponseStore::open(dir.path().to_path_buf()).await.unwrap();

        assert!(store.get("/video/absent.ts").await.is_none());

        let stats = store.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = tempdir().unwrap();
        let store = ResponseStore::open(dir.path().to_path_buf()).await.unwrap();

        store.put("/a.ts", &response(b"a")).await.unwrap();
        assert!(store.delete("/a.ts").await.unwrap());
        assert!(!store.delete("/a.ts").await.unwrap());
        assert!(store.get("/a.ts").await.is_none());
    }

    #[tokio::test]
    async fn test_keys_insertion_order() {
        let dir = tempdir().unwrap();
        let store = ResponseStore::open(dir.path().to_path_buf()).await.unwrap();

        store.put("/a.ts", &response(b"a")).await.unwrap();
        store.put("/b.ts", &response(b"b")).await.unwrap();
        store.put("/c.ts", &response(b"c")).await.unwrap();

        assert_eq!(store.keys().await, vec!["/a.ts", "/b.ts", "/c.ts"]);
    }

    #[tokio::test]
    async fn test_overwrite_moves_to_back() {
        let dir = tempdir().unwrap();
        let store = ResponseStore::open(dir.path().to_path_buf()).await.unwrap();

        store.put("/a.ts", &response(b"a1")).await.unwrap();
        store.put("/b.ts", &response(b"b")).await.unwrap();
        store.put("/a.ts", &response(b"a2")).await.unwrap();

        // One entry per key, re-sequenced to most recent
        assert_eq!(store.keys().await, vec!["/b.ts", "/a.ts"]);
        assert_eq!(store.get("/a.ts").await.unwrap().body, b"a2");

        let stats = store.stats().await;
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.total_size, 3); // "a2" + "b"
    }

    #[tokio::test]
    async fn test_persists_across_open() {
        let dir = tempdir().unwrap();

        {
            let store = ResponseStore::open(dir.path().to_path_buf()).await.unwrap();
            store.put("/a.ts", &response(b"a")).await.unwrap();
            store.put("/b.ts", &response(b"b")).await.unwrap();
        }

        let reopened = ResponseStore::open(dir.path().to_path_buf()).await.unwrap();
        assert_eq!(reopened.keys().await, vec!["/a.ts", "/b.ts"]);
        assert_eq!(reopened.get("/b.ts").await.unwrap().body, b"b");

        // Sequence numbering continues past reloaded entries
        reopened.put("/c.ts", &response(b"c")).await.unwrap();
        assert_eq!(reopened.keys().await, vec!["/a.ts", "/b.ts", "/c.ts"]);
    }

    #[tokio::test]
    async fn test_concurrent_puts_all_persisted() {
        let dir = tempdir().unwrap();
        let store = ResponseStore::open(dir.path().to_path_buf()).await.unwrap();

        let resp_a = response(b"a");
        let resp_b = response(b"b");
        let (a, b) = tokio::join!(
            store.put("/a.ts", &resp_a),
            store.put("/b.ts", &resp_b),
        );
        a.unwrap();
        b.unwrap();

        // Every put that returned Ok must survive a restart, whichever
        // order the index writes landed in
        let reopened = ResponseStore::open(dir.path().to_path_buf()).await.unwrap();
        assert!(reopened.contains("/a.ts").await);
        assert!(reopened.contains("/b.ts").await);
        assert_eq!(reopened.stats().await.entries, 2);
    }

    #[tokio::test]
    async fn test_hit_miss_counters() {
        let dir = tempdir().unwrap();
        let store = ResponseStore::open(dir.path().to_path_buf()).await.unwrap();

        store.get("/a.ts").await;
        store.put("/a.ts", &response(b"a")).await.unwrap();
        store.get("/a.ts").await;

        let stats = store.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_non_success_status_is_stored_as_is() {
        let dir = tempdir().unwrap();
        let store = ResponseStore::open(dir.path().to_path_buf()).await.unwrap();

        let not_found = StoredResponse {
            status: 404,
            content_type: "text/plain".to_string(),
            body: b"gone".to_vec(),
        };
        store.put("/missing.ts", &not_found).await.unwrap();

        let got = store.get("/missing.ts").await.unwrap();
        assert_eq!(got.status, 404);
    }
}
