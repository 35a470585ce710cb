//! Lazily-connected store wrapper.
//!
//! The first operation establishes the backend connection. Callers that
//! arrive while the connection is being established wait for that same
//! attempt instead of starting their own.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use paysaga_types::{StateStore, StoreError};

/// Opens a connection to a store backend.
#[async_trait]
pub trait StoreConnector: Send + Sync + 'static {
    type Store: StateStore;

    /// Human-readable backend name for logs.
    fn backend(&self) -> &str;

    async fn connect(&self) -> Result<Self::Store, StoreError>;
}

/// A [`StateStore`] that connects on first use.
///
/// A failed connection attempt is not cached: the next caller retries.
pub struct LazyStore<C: StoreConnector> {
    connector: C,
    connection: OnceCell<C::Store>,
}

impl<C: StoreConnector> LazyStore<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            connection: OnceCell::new(),
        }
    }

    /// True once a connection has been established.
    pub fn is_initialized(&self) -> bool {
        self.connection.initialized()
    }

    async fn connection(&self) -> Result<&C::Store, StoreError> {
        self.connection
            .get_or_try_init(|| async {
                info!(backend = self.connector.backend(), "Connecting to state store");
                let store = self.connector.connect().await?;
                info!(backend = self.connector.backend(), "State store connected");
                Ok(store)
            })
            .await
    }
}

#[async_trait]
impl<C: StoreConnector> StateStore for LazyStore<C> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.connection().await?.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        self.connection().await?.set(key, value, ttl_seconds).await
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        self.connection().await?.del(key).await
    }

    async fn is_connected(&self) -> bool {
        match self.connection().await {
            Ok(store) => store.is_connected().await,
            Err(e) => {
                warn!(backend = self.connector.backend(), error = %e, "State store unreachable");
                false
            }
        }
    }
}
