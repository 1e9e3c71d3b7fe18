//! Named store registry for versioned cache rotation

use crate::error::Result;
use crate::store::ResponseStore;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info};

/// Manages named response stores under a root directory.
///
/// Each cache version gets its own store in a subdirectory; activation
/// of a new version deletes the others wholesale.
pub struct StoreRegistry {
    root: PathBuf,
}

impl StoreRegistry {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Ensure the registry root directory exists
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        info!(root = ?self.root, "Store registry initialized");
        Ok(())
    }

    /// Open (creating if absent) the store with the given name
    pub async fn open(&self, name: &str) -> Result<ResponseStore> {
        ResponseStore::open(self.root.join(name)).await
    }

    /// Names of all stores currently present
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                if let Ok(name) = entry.file_name().into_string() {
                    names.push(name);
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete a store and all of its entries
    pub async fn delete(&self, name: &str) -> Result<()> {
        fs::remove_dir_all(self.root.join(name)).await?;
        debug!(name = %name, "Deleted store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StoredResponse;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_creates_store() {
        let dir = tempdir().unwrap();
        let registry = StoreRegistry::new(dir.path().to_path_buf());
        registry.init().await.unwrap();

        let store = registry.open("cache-v1").await.unwrap();
        store
            .put(
                "/index.html",
                &StoredResponse {
                    status: 200,
                    content_type: "text/html".to_string(),
                    body: b"<html></html>".to_vec(),
                },
            )
            .await
            .unwrap();

        assert_eq!(registry.list().await.unwrap(), vec!["cache-v1"]);
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let dir = tempdir().unwrap();
        let registry = StoreRegistry::new(dir.path().to_path_buf());
        registry.init().await.unwrap();

        registry.open("cache-v1").await.unwrap();
        registry.open("cache-v2").await.unwrap();
        assert_eq!(
            registry.list().await.unwrap(),
            vec!["cache-v1", "cache-v2"]
        );

        registry.delete("cache-v1").await.unwrap();
        assert_eq!(registry.list().await.unwrap(), vec!["cache-v2"]);
    }

    #[tokio::test]
    async fn test_delete_missing_store_errors() {
        let dir = tempdir().unwrap();
        let registry = StoreRegistry::new(dir.path().to_path_buf());
        registry.init().await.unwrap();

        assert!(registry.delete("cache-v9").await.is_err());
    }

    #[tokio::test]
    async fn test_list_empty() {
        let dir = tempdir().unwrap();
        let registry = StoreRegistry::new(dir.path().to_path_buf());
        registry.init().await.unwrap();

        assert!(registry.list().await.unwrap().is_empty());
    }
}
