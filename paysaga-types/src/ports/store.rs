//! State store port.

use crate::error::StoreError;

/// Key/value store with per-entry expiry.
///
/// Shared by every saga in the process; writes are last-writer-wins.
#[async_trait::async_trait]
pub trait StateStore: Send + Sync + 'static {
    /// Reads a key. Expired and missing keys both read as `None`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes a key that expires after `ttl_seconds`; `0` never expires.
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError>;

    /// Deletes a key. Deleting a missing key is not an error.
    async fn del(&self, key: &str) -> Result<(), StoreError>;

    /// Reports whether the store is reachable, establishing the
    /// connection if needed.
    async fn is_connected(&self) -> bool;
}

#[async_trait::async_trait]
impl<T: StateStore + ?Sized> StateStore for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        (**self).set(key, value, ttl_seconds).await
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        (**self).del(key).await
    }

    async fn is_connected(&self) -> bool {
        (**self).is_connected().await
    }
}
