//! File-backed response store with versioned rotation
//!
//! Stores HTTP response snapshots on disk keyed by request URL, with
//! in-memory metadata tracking and explicit insertion-order sequencing.
//! A registry manages one store per cache version so old versions can
//! be deleted wholesale when a new one takes over.

mod error;
mod registry;
mod store;
mod types;

pub use error::{Result, StoreError};
pub use registry::StoreRegistry;
pub use store::ResponseStore;
pub use types::{EntryMeta, StoreStats, StoredResponse};
