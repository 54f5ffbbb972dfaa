use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

/// Callback fired when a key changes. Listeners get no payload and must
/// re-read whatever state they care about.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`ChangeBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Per-key listener registry.
#[derive(Default)]
pub struct ChangeBus {
    /// key -> listeners in subscription order
    listeners: RwLock<HashMap<String, Vec<(ListenerId, Listener)>>>,
    next_id: AtomicU64,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, key: &str, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.to_string())
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Returns false if the listener was not subscribed to `key`.
    pub fn unsubscribe(&self, key: &str, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let Some(entries) = listeners.get_mut(key) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        let removed = entries.len() != before;

        if entries.is_empty() {
            listeners.remove(key);
        }
        removed
    }

    /// Invoke every listener for `key` once, in subscription order.
    /// Returns how many were called.
    ///
    /// The registry lock is released before any callback runs, so a
    /// listener may read the store or (un)subscribe without deadlocking.
    /// Changes it makes to the registry apply from the next notification.
    pub fn notify(&self, key: &str) -> usize {
        let snapshot: Vec<Listener> = {
            let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
            match listeners.get(key) {
                Some(entries) => entries.iter().map(|(_, l)| l.clone()).collect(),
                None => return 0,
            }
        };

        debug!(key, listeners = snapshot.len(), "notifying change");
        for listener in &snapshot {
            listener();
        }
        snapshot.len()
    }

    pub fn listener_count(&self, key: &str) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map_or(0, Vec::len)
    }
}
