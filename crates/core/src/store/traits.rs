use async_trait::async_trait;

use super::types::{ObjectMeta, StoreError, StoredObject};

/// A tiered object store holding the stage, curated and application buckets.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the name of this store backend.
    fn name(&self) -> &str;

    /// Fetch authoritative metadata for an object.
    ///
    /// Values embedded in arrival notifications are never trusted; this is
    /// the single source of truth for size and content type.
    async fn head(&self, bucket: &str, key: &str) -> Result<ObjectMeta, StoreError>;

    /// Read an object's payload.
    async fn get(&self, bucket: &str, key: &str) -> Result<StoredObject, StoreError>;

    /// Write an object.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError>;
}
