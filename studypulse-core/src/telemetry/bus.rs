//! In-process event bus for snapshot fan-out.
//!
//! Subscribers register a callback under an event name; the engine emits the
//! full snapshot to every callback registered under that name. Callbacks run
//! synchronously inside the emitting call and must return quickly.
//!
//! Each invocation is isolated: a panicking subscriber is caught and logged,
//! and the remaining subscribers still receive the snapshot.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::types::Snapshot;

/// The only event the feed currently emits.
pub const EVENT_UPDATE: &str = "update";

/// Boxed subscriber callback.
pub type SnapshotCallback = Box<dyn Fn(&Snapshot) + Send>;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
///
/// Closures are not comparable, so unsubscription goes through this token
/// rather than the callback itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberToken {
    event: String,
    id: u64,
}

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: HashMap<String, Vec<(u64, SnapshotCallback)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback under an event name.
    pub fn subscribe(&mut self, event: &str, callback: SnapshotCallback) -> SubscriberToken {
        self.next_id += 1;
        let id = self.next_id;
        self.listeners
            .entry(event.to_string())
            .or_default()
            .push((id, callback));
        SubscriberToken {
            event: event.to_string(),
            id,
        }
    }

    /// Remove the callback the token refers to. Returns whether it was found.
    pub fn unsubscribe(&mut self, token: &SubscriberToken) -> bool {
        match self.listeners.get_mut(&token.event) {
            Some(callbacks) => {
                let before = callbacks.len();
                callbacks.retain(|(id, _)| *id != token.id);
                callbacks.len() != before
            }
            None => false,
        }
    }

    /// Number of callbacks registered under an event name.
    pub fn subscriber_count(&self, event: &str) -> usize {
        self.listeners.get(event).map_or(0, Vec::len)
    }

    /// Invoke every callback registered under `event` with the snapshot.
    pub fn emit(&self, event: &str, snapshot: &Snapshot) {
        let Some(callbacks) = self.listeners.get(event) else {
            return;
        };
        for (id, callback) in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(snapshot))).is_err() {
                tracing::warn!(event, subscriber = id, "subscriber callback panicked");
            }
        }
    }
}
