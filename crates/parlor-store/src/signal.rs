use std::sync::Arc;

use tokio::sync::broadcast;

use parlor_types::events::StorageEvent;

const SIGNAL_CAPACITY: usize = 1024;

/// Cross-context change signal.
///
/// Every context sharing one storage backend holds a clone. A context
/// publishes after each write; the others pick the event up through their
/// own receiver and re-notify their local listeners.
#[derive(Clone)]
pub struct StorageSignal {
    inner: Arc<SignalInner>,
}

struct SignalInner {
    tx: broadcast::Sender<StorageEvent>,
}

impl StorageSignal {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self {
            inner: Arc::new(SignalInner { tx }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.inner.tx.subscribe()
    }

    /// Fire and forget; having no receivers is fine.
    pub fn publish(&self, event: StorageEvent) {
        let _ = self.inner.tx.send(event);
    }
}

impl Default for StorageSignal {
    fn default() -> Self {
        Self::new()
    }
}
