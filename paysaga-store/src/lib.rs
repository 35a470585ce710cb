//! # Paysaga Store
//!
//! Concrete state store implementations (adapters) for the payment saga service.
//! This crate provides the adapters that implement the `StateStore` port.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use paysaga_types::{StateStore, StoreError};

pub mod lazy;
pub mod memory;
pub mod sweeper;

pub use lazy::{LazyStore, StoreConnector};
pub use memory::MemoryStore;
pub use sweeper::ExpirySweeper;

/// Connector for the in-process backend.
///
/// "Connecting" hands out a shared handle to one process-wide map.
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
}

impl MemoryConnector {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    type Store = Arc<MemoryStore>;

    fn backend(&self) -> &str {
        "memory"
    }

    async fn connect(&self) -> Result<Arc<MemoryStore>, StoreError> {
        Ok(self.store.clone())
    }
}

/// Unified store handle built from a store URL.
pub struct Store {
    inner: LazyStore<MemoryConnector>,
    memory: Arc<MemoryStore>,
}

/// Build a lazily-connected store from a URL.
///
/// Supported backends:
///
/// ```ignore
/// let store = build_store("memory://")?;
/// ```
pub fn build_store(store_url: &str) -> anyhow::Result<Store> {
    Store::new(store_url)
}

impl Store {
    pub fn new(store_url: &str) -> anyhow::Result<Self> {
        let scheme = store_url
            .split_once("://")
            .map_or(store_url, |(scheme, _)| scheme);

        match scheme {
            "memory" => Ok(Self::memory()),
            other => anyhow::bail!("Unsupported store backend: {}. Supported: memory", other),
        }
    }

    /// An in-process store.
    pub fn memory() -> Self {
        let memory = Arc::new(MemoryStore::new());
        Self {
            inner: LazyStore::new(MemoryConnector::new(memory.clone())),
            memory,
        }
    }

    /// Starts the background expiry sweeper on the current runtime.
    pub fn spawn_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(ExpirySweeper::new(self.memory.clone(), interval).run())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Implement StateStore for Store (delegation)
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl StateStore for Store {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        self.inner.set(key, value, ttl_seconds).await
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        self.inner.del(key).await
    }

    async fn is_connected(&self) -> bool {
        self.inner.is_connected().await
    }
}
