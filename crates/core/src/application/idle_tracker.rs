// Idle-thread tracker - deduplicated set of workers that reported WorkerWaiting
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use crate::domain::WorkerId;

/// Workers that have parked since the last `reset`
///
/// `record` is called from any worker; the harness reads `size` from its own
/// task. All state changes happen under the mutex.
#[derive(Debug, Default)]
pub struct IdleThreadTracker {
    idle: Mutex<HashSet<WorkerId>>,
}

impl IdleThreadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if `worker` was already counted
    pub fn record(&self, worker: WorkerId) -> bool {
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(worker)
    }

    pub fn size(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn contains(&self, worker: WorkerId) -> bool {
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&worker)
    }

    pub fn reset(&self) {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
