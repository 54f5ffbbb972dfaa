pub mod accounts;
pub mod bus;
pub mod comments;
pub mod error;
pub mod groups;
pub mod keys;
pub mod messages;
pub mod migrations;
pub mod posts;
pub mod session;
pub mod signal;
pub mod storage;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, warn};
use uuid::Uuid;

use parlor_types::events::StorageEvent;

pub use bus::{ChangeBus, Listener, ListenerId};
pub use error::{Result, StoreError};
pub use session::SessionManager;
pub use signal::StorageSignal;
pub use storage::{KeyValueStorage, MemoryStorage, SqliteStorage};

/// Collection-level access to key-value storage.
///
/// Every mutation reads a whole collection, changes it in memory and writes
/// it back in full, then tells the listeners of that key. There is no
/// locking: two contexts writing the same key concurrently means the last
/// writer wins.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    storage: Arc<dyn KeyValueStorage>,
    bus: ChangeBus,
    signal: Option<StorageSignal>,
    /// Identifies this execution context on the cross-context signal.
    context_id: Uuid,
}

impl Store {
    /// A store that only notifies its own listeners.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::build(storage, None)
    }

    /// A store that also publishes its writes on `signal`, so other
    /// contexts sharing the same storage can re-notify their listeners.
    pub fn with_signal(storage: Arc<dyn KeyValueStorage>, signal: StorageSignal) -> Self {
        Self::build(storage, Some(signal))
    }

    fn build(storage: Arc<dyn KeyValueStorage>, signal: Option<StorageSignal>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                storage,
                bus: ChangeBus::new(),
                signal,
                context_id: Uuid::new_v4(),
            }),
        }
    }

    pub fn context_id(&self) -> Uuid {
        self.inner.context_id
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.inner.bus
    }

    pub fn signal(&self) -> Option<&StorageSignal> {
        self.inner.signal.as_ref()
    }

    pub fn subscribe<F>(&self, key: &str, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.bus.subscribe(key, listener)
    }

    pub fn unsubscribe(&self, key: &str, id: ListenerId) -> bool {
        self.inner.bus.unsubscribe(key, id)
    }

    // -- Collections --

    /// Whole collection under `key`, for display. Missing keys, backend
    /// failures and unparsable payloads all read as an empty collection.
    /// Never use this as the base of a write; see [`load`](Self::load).
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.load(key) {
            Ok(records) => records,
            Err(e) => {
                warn!(key, "Storage read failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Whole collection under `key` as the base of a read-modify-write.
    /// Missing keys and unparsable payloads are empty; a backend failure
    /// is an error so the caller never overwrites records it could not see.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        Ok(self.read_value(key)?.unwrap_or_default())
    }

    /// Replace the collection under `key`, then notify.
    pub fn write<T: Serialize>(&self, key: &str, records: &[T]) -> Result<()> {
        self.write_value(key, records)
    }

    // -- Single values --

    /// `Ok(None)` for a missing key or an unparsable payload.
    pub fn read_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.inner.storage.get_item(key)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, "Ignoring unparsable payload: {}", e);
                Ok(None)
            }
        }
    }

    pub fn write_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.inner.storage.set_item(key, &raw)?;
        self.changed(key);
        Ok(())
    }

    /// Delete `key` entirely. Notifies like a write.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.inner.storage.remove_item(key)?;
        self.changed(key);
        Ok(())
    }

    fn changed(&self, key: &str) {
        self.inner.bus.notify(key);
        if let Some(signal) = &self.inner.signal {
            signal.publish(StorageEvent::new(key, self.inner.context_id));
        }
    }

    // -- Cross-context events --

    /// Re-notify local listeners for a change made by another context.
    /// Returns false for events this context published itself.
    pub fn handle_storage_event(&self, event: &StorageEvent) -> bool {
        if !event.is_foreign_to(self.inner.context_id) {
            return false;
        }

        debug!(key = %event.key, origin = %event.origin, "foreign storage change");
        self.inner.bus.notify(&event.key);
        true
    }

    /// Deliver every event already queued on `rx` without waiting.
    /// Returns how many foreign events were delivered.
    pub fn drain_storage_events(&self, rx: &mut broadcast::Receiver<StorageEvent>) -> usize {
        let mut delivered = 0;
        loop {
            match rx.try_recv() {
                Ok(event) => {
                    if self.handle_storage_event(&event) {
                        delivered += 1;
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Storage event receiver lagged; events dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        delivered
    }

    /// Deliver storage events as they arrive until every publisher is gone.
    pub async fn run_storage_events(self, mut rx: broadcast::Receiver<StorageEvent>) {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    self.handle_storage_event(&event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Storage event receiver lagged; events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}
