use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{config::Config, engine::Snapshot};

/// Shared application state: the configuration plus the current data
/// snapshot.
///
/// The snapshot itself is immutable; the lock only guards the `Arc` slot.
/// Readers clone the `Arc` and then work lock-free against a consistent
/// snapshot, while a reload builds the replacement off to the side and
/// swaps the reference in one write.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    snapshot: Arc<RwLock<Arc<Snapshot>>>,
}

impl AppState {
    pub fn new(config: Config, snapshot: Snapshot) -> Self {
        Self {
            config: Arc::new(config),
            snapshot: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    /// The current snapshot. Holds the lock only long enough to clone the
    /// reference.
    pub async fn current(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    /// Publishes a freshly built snapshot. In-flight readers keep the old
    /// one until they finish.
    pub async fn publish(&self, snapshot: Snapshot) {
        *self.snapshot.write().await = Arc::new(snapshot);
    }
}
