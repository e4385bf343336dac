//! Observer registration and dispatch
//!
//! Hooks run on the calling thread after the operation has committed and
//! the collection lock has been released. A hook may therefore call back
//! into the same collection. Hooks are advisory: a panicking hook is logged
//! and skipped, and the operation's result is unaffected.

use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use stowage_core::CollectionEvent;
use tracing::error;

/// Callback invoked for every collection event
pub type EventCallback = Arc<dyn Fn(&CollectionEvent) + Send + Sync>;

/// Handle returned by `on_event`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Registered observers of one collection
#[derive(Default)]
pub struct EventHooks {
    next_id: AtomicU64,
    callbacks: RwLock<Vec<(SubscriptionId, EventCallback)>>,
}

impl EventHooks {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&CollectionEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks.write().push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self.callbacks.write();
        let before = callbacks.len();
        callbacks.retain(|(existing, _)| *existing != id);
        callbacks.len() != before
    }

    /// Number of registered callbacks
    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    /// True if no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.read().is_empty()
    }

    /// Deliver `events` to every registered callback, in order.
    pub fn dispatch(&self, events: &[CollectionEvent]) {
        if events.is_empty() {
            return;
        }
        // Snapshot so callbacks can (un)subscribe without deadlocking
        let callbacks: Vec<EventCallback> = self
            .callbacks
            .read()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for event in events {
            for callback in &callbacks {
                if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                    error!(target: "stowage::events", event = ?event, "Event hook panicked");
                }
            }
        }
    }
}

impl std::fmt::Debug for EventHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHooks")
            .field("callbacks", &self.len())
            .finish()
    }
}
