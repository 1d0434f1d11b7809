// ── Subscriber registry ──
//
// Handlers registered by hosts, notified once per completed attempt. Each
// notification runs on the blocking pool and is never awaited.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tracing::trace;

type Handler = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct SubscriberRegistry {
    next_id: AtomicU64,
    handlers: DashMap<u64, Handler>,
}

impl SubscriberRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register `handler` until the returned [`Subscription`] is dropped.
    pub fn subscribe<F>(self: &Arc<Self>, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers.insert(id, Arc::new(handler));
        trace!(id, "subscriber registered");
        Subscription {
            id,
            registry: Arc::downgrade(self),
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run every handler once on the blocking pool. Returns how many were started.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn notify_all(&self) -> usize {
        // Snapshot first so no shard lock is held while spawning.
        let handlers: Vec<Handler> = self
            .handlers
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        for handler in &handlers {
            let handler = Arc::clone(handler);
            drop(tokio::task::spawn_blocking(move || handler()));
        }
        handlers.len()
    }

    fn remove(&self, id: u64) {
        if self.handlers.remove(&id).is_some() {
            trace!(id, "subscriber removed");
        }
    }
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}

/// Scoped registration. Dropping it unsubscribes the handler.
#[must_use = "dropping a Subscription unsubscribes its handler"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<SubscriberRegistry>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Unsubscribe now rather than at end of scope.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}
