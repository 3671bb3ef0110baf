use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use tracing::debug;
use uuid::Uuid;

use surplus_types::events::{DashboardKind, SyncEvent};

/// Fans store change notifications out to every open dashboard.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    /// Broadcast channel for store changes; every open tab receives every event
    broadcast_tx: broadcast::Sender<SyncEvent>,

    /// Connected dashboards: tab_id -> dashboard kind
    open_tabs: RwLock<HashMap<Uuid, DashboardKind>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(1024);
        Self {
            inner: Arc::new(DispatcherInner {
                broadcast_tx,
                open_tabs: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Subscribe to store changes. Returns a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    /// Broadcast an event to all subscribers. Having no subscribers is fine.
    pub fn broadcast(&self, event: SyncEvent) {
        let receivers = self.inner.broadcast_tx.send(event).unwrap_or(0);
        debug!("Store change delivered to {} subscribers", receivers);
    }

    pub async fn tab_opened(&self, tab_id: Uuid, kind: DashboardKind) {
        self.inner.open_tabs.write().await.insert(tab_id, kind);
    }

    pub async fn tab_closed(&self, tab_id: Uuid) {
        self.inner.open_tabs.write().await.remove(&tab_id);
    }

    /// Number of dashboards currently connected.
    pub async fn open_tab_count(&self) -> usize {
        self.inner.open_tabs.read().await.len()
    }
}
