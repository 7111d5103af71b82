// Worker Domain Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one bus worker
///
/// The worker's index in its pool. Stable for the worker's lifetime; reused by
/// the next pool, which is fine because idle sets are reset per iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerId(usize);

impl WorkerId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Raised by a worker that found its queue empty and is about to nap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerWaiting {
    pub worker: WorkerId,
}

/// Worker lifecycle: `Starting -> Busy <-> Idle -> Stopping`
///
/// Only entering `Idle` is observable from outside, through `WorkerWaiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Starting,
    Busy,
    Idle,
    Stopping,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Starting => write!(f, "STARTING"),
            WorkerState::Busy => write!(f, "BUSY"),
            WorkerState::Idle => write!(f, "IDLE"),
            WorkerState::Stopping => write!(f, "STOPPING"),
        }
    }
}
