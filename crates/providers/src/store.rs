//! Image Stores
//!
//! Storage adapters behind the `ImageStore` port. References are opaque
//! strings to everything upstream.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use listinglens_core::{CoreResult, ImageStore, PipelineError};

// ============================================================================
// Filesystem Store
// ============================================================================

/// Content-addressed filesystem store. References are absolute paths under
/// the store root, named by content hash so re-writing identical bytes is
/// idempotent.
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn read(&self, storage_ref: &str) -> CoreResult<Vec<u8>> {
        let path = PathBuf::from(storage_ref);
        if !path.starts_with(&self.root) {
            return Err(PipelineError::storage(format!(
                "ref outside store root: {}",
                storage_ref
            )));
        }
        Ok(tokio::fs::read(&path).await?)
    }

    async fn write(&self, bytes: &[u8]) -> CoreResult<String> {
        let digest = hex::encode(Sha256::digest(bytes));
        let path = self.root.join(format!("{}.bin", digest));
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, bytes).await?;
        Ok(path.to_string_lossy().into_owned())
    }
}

// ============================================================================
// Memory Store
// ============================================================================

/// In-memory store for tests and local pipelines.
#[derive(Default)]
pub struct MemoryImageStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn read(&self, storage_ref: &str) -> CoreResult<Vec<u8>> {
        self.entries
            .read()
            .await
            .get(storage_ref)
            .cloned()
            .ok_or_else(|| PipelineError::storage(format!("no such ref: {}", storage_ref)))
    }

    async fn write(&self, bytes: &[u8]) -> CoreResult<String> {
        let digest = hex::encode(Sha256::digest(bytes));
        let storage_ref = format!("mem://{}", digest);
        self.entries
            .write()
            .await
            .insert(storage_ref.clone(), bytes.to_vec());
        Ok(storage_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryImageStore::new();
        let r = store.write(b"hello").await.unwrap();
        assert_eq!(store.read(&r).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_memory_store_missing_ref() {
        let store = MemoryImageStore::new();
        assert!(matches!(
            store.read("mem://nope").await,
            Err(PipelineError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_store_identical_bytes_share_ref() {
        let store = MemoryImageStore::new();
        let a = store.write(b"same").await.unwrap();
        let b = store.write(b"same").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_fs_store_rejects_foreign_refs() {
        let store = FsImageStore::new("/tmp/listinglens-store");
        assert!(matches!(
            store.read("/etc/passwd").await,
            Err(PipelineError::Storage(_))
        ));
    }
}
