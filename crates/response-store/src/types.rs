//! Store types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Snapshot of an HTTP response held by the store.
///
/// Whatever the upstream returned is what gets stored: the status code
/// is carried as data, not interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Metadata for a stored response entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMeta {
    /// On-disk location of the response body
    pub path: PathBuf,
    pub status: u16,
    pub content_type: String,
    pub size: u64,
    /// Insertion sequence number; lower means inserted earlier.
    /// An overwrite is assigned a fresh number.
    pub seq: u64,
    pub inserted_at: DateTime<Utc>,
}

/// Statistics about a store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    pub entries: usize,
    /// Entries counted against the media bound. The store itself is
    /// policy-agnostic, so the layer that owns the suffix policy fills
    /// this in.
    pub media_entries: usize,
    pub total_size: u64,
    pub hits: u64,
    pub misses: u64,
}
