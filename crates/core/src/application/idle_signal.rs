// Worker-idle signal adapter - bridges WorkerWaiting events into the tracker
use std::sync::Arc;

use super::idle_tracker::IdleThreadTracker;
use crate::domain::WorkerWaiting;
use crate::port::{BusEvents, Subscription, WorkerWaitingHandler};

pub struct IdleSignalAdapter {
    tracker: Arc<IdleThreadTracker>,
}

impl IdleSignalAdapter {
    pub fn new(tracker: Arc<IdleThreadTracker>) -> Self {
        Self { tracker }
    }

    /// Subscribe a new adapter for `tracker` to `events`
    pub fn attach(tracker: Arc<IdleThreadTracker>, events: &BusEvents) -> Subscription {
        events.subscribe_worker_waiting(Arc::new(Self::new(tracker)))
    }
}

impl WorkerWaitingHandler for IdleSignalAdapter {
    fn on_worker_waiting(&self, event: &WorkerWaiting) {
        self.tracker.record(event.worker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkerId;

    #[test]
    fn test_events_land_in_tracker() {
        let events = BusEvents::new();
        let tracker = Arc::new(IdleThreadTracker::new());
        let _subscription = IdleSignalAdapter::attach(Arc::clone(&tracker), &events);

        for index in [0, 1, 1, 2, 0] {
            events.raise_worker_waiting(WorkerWaiting {
                worker: WorkerId::new(index),
            });
        }

        assert_eq!(tracker.size(), 3);
    }

    #[test]
    fn test_detached_adapter_stops_recording() {
        let events = BusEvents::new();
        let tracker = Arc::new(IdleThreadTracker::new());
        let subscription = IdleSignalAdapter::attach(Arc::clone(&tracker), &events);

        drop(subscription);
        events.raise_worker_waiting(WorkerWaiting {
            worker: WorkerId::new(0),
        });

        assert_eq!(tracker.size(), 0);
    }
}
