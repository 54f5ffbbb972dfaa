use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A key changed in shared storage.
///
/// Published by the context that performed the write and delivered to
/// every other context sharing the same storage. Receivers re-read the
/// key themselves; the event carries no payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEvent {
    pub key: String,
    /// Context id of the writer.
    pub origin: Uuid,
}

impl StorageEvent {
    pub fn new(key: impl Into<String>, origin: Uuid) -> Self {
        Self {
            key: key.into(),
            origin,
        }
    }

    /// Events that came from the receiving context itself are already
    /// covered by the direct post-write fan-out.
    pub fn is_foreign_to(&self, context_id: Uuid) -> bool {
        self.origin != context_id
    }
}
