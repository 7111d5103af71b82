// Bus event stream - WorkerWaiting subscriptions
//
// Handlers run on whichever worker raised the event, so they must be cheap
// and thread-safe.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tracing::debug;

use crate::domain::WorkerWaiting;

/// Receiver of `WorkerWaiting` events
pub trait WorkerWaitingHandler: Send + Sync {
    fn on_worker_waiting(&self, event: &WorkerWaiting);
}

impl<F> WorkerWaitingHandler for F
where
    F: Fn(&WorkerWaiting) + Send + Sync,
{
    fn on_worker_waiting(&self, event: &WorkerWaiting) {
        self(event)
    }
}

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(u64, Arc<dyn WorkerWaitingHandler>)>>,
}

impl Registry {
    fn remove(&self, id: u64) {
        let mut handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        handlers.retain(|(handler_id, _)| *handler_id != id);
    }
}

/// Event stream exposed by a bus runtime
///
/// Cloning shares the same subscriber list.
#[derive(Clone, Default)]
pub struct BusEvents {
    registry: Arc<Registry>,
}

impl BusEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a handler until the returned subscription is dropped
    #[must_use = "dropping the subscription detaches the handler"]
    pub fn subscribe_worker_waiting(&self, handler: Arc<dyn WorkerWaitingHandler>) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, handler));

        debug!(subscription = id, "WorkerWaiting handler attached");

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver `event` to every attached handler
    pub fn raise_worker_waiting(&self, event: WorkerWaiting) {
        // Snapshot so handlers run without the registry lock held
        let handlers: Vec<Arc<dyn WorkerWaitingHandler>> = self
            .registry
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in handlers {
            handler.on_worker_waiting(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Detach every handler
    pub fn clear(&self) {
        self.registry
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Scoped handler registration
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn detach(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
            debug!(subscription = self.id, "WorkerWaiting handler detached");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkerId;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, Arc<dyn WorkerWaitingHandler>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let handler: Arc<dyn WorkerWaitingHandler> = Arc::new(move |_: &WorkerWaiting| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (count, handler)
    }

    #[test]
    fn test_raise_reaches_all_subscribers() {
        let events = BusEvents::new();
        let (a, handler_a) = counter();
        let (b, handler_b) = counter();
        let _sub_a = events.subscribe_worker_waiting(handler_a);
        let _sub_b = events.subscribe_worker_waiting(handler_b);

        events.raise_worker_waiting(WorkerWaiting { worker: WorkerId::new(0) });

        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropping_subscription_detaches() {
        let events = BusEvents::new();
        let (count, handler) = counter();
        let subscription = events.subscribe_worker_waiting(handler);
        assert_eq!(events.subscriber_count(), 1);

        subscription.detach();
        events.raise_worker_waiting(WorkerWaiting { worker: WorkerId::new(1) });

        assert_eq!(events.subscriber_count(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clear_then_drop_subscription_is_harmless() {
        let events = BusEvents::new();
        let (_, handler) = counter();
        let subscription = events.subscribe_worker_waiting(handler);

        events.clear();
        drop(subscription);

        assert_eq!(events.subscriber_count(), 0);
    }

    #[test]
    fn test_subscription_outliving_events() {
        let events = BusEvents::new();
        let (_, handler) = counter();
        let subscription = events.subscribe_worker_waiting(handler);

        drop(events);
        drop(subscription);
    }
}
