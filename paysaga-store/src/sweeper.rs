use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, instrument};

use crate::MemoryStore;

/// Background task that periodically drops expired entries so keys nobody
/// reads again do not accumulate.
pub struct ExpirySweeper {
    store: Arc<MemoryStore>,
    interval: Duration,
}

impl ExpirySweeper {
    pub fn new(store: Arc<MemoryStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    #[instrument(skip(self))]
    pub async fn run(self) {
        info!("Starting store expiry sweeper every {:?}", self.interval);
        loop {
            sleep(self.interval).await;
            let purged = self.store.purge_expired();
            if purged > 0 {
                debug!(purged, remaining = self.store.len(), "Purged expired entries");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use paysaga_types::StateStore;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_purges_expired_entries() {
        let store = Arc::new(MemoryStore::new());
        store.set("short", "1", 1).await.unwrap();
        store.set("long", "2", 3600).await.unwrap();

        let handle = tokio::spawn(ExpirySweeper::new(store.clone(), Duration::from_secs(1)).run());

        sleep(Duration::from_secs(3)).await;

        assert_eq!(store.len(), 1);
        handle.abort();
    }
}
