/// In-memory blob store
///
/// Used by tests and local experiments. `fail_deletes` makes every delete
/// return a backend error so callers can exercise partial-failure paths.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{validate_key, BlobError, BlobResult, BlobStore};

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Bytes>>,
    fail_deletes: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent deletes fail until switched off again
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.blobs.read().await.contains_key(path)
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn put(&self, path: &str, bytes: Bytes) -> BlobResult<()> {
        validate_key(path)?;
        self.blobs.write().await.insert(path.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, path: &str) -> BlobResult<Bytes> {
        validate_key(path)?;
        self.blobs
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(path.to_string()))
    }

    async fn delete(&self, path: &str) -> BlobResult<bool> {
        validate_key(path)?;

        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(BlobError::Backend(format!("injected delete failure for {}", path)));
        }

        Ok(self.blobs.write().await.remove(path).is_some())
    }
}
