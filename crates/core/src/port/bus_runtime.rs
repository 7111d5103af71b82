// Bus runtime port - the worker pool under test
// reason: async-trait because stopping joins worker tasks
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::bus_events::BusEvents;
use super::queue::Queue;
use super::serializer::Serializer;
use crate::domain::TransportMessageFactory;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("Bus already started")]
    AlreadyStarted,

    #[error("Bus failed to start: {0}")]
    StartFailed(String),

    #[error("Bus failed to stop cleanly: {0}")]
    StopFailed(String),

    #[error("Invalid bus configuration: {0}")]
    Configuration(String),
}

/// Inbox the workers consume from
#[derive(Clone)]
pub struct InboxQueueConfiguration {
    pub work_queue: Arc<dyn Queue>,
    pub error_queue: Arc<dyn Queue>,
    pub thread_count: usize,
    /// Naps between empty polls; the last entry repeats
    pub duration_to_sleep_when_idle: Vec<Duration>,
}

impl fmt::Debug for InboxQueueConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboxQueueConfiguration")
            .field("work_queue", &self.work_queue.uri().to_string())
            .field("error_queue", &self.error_queue.uri().to_string())
            .field("thread_count", &self.thread_count)
            .field("duration_to_sleep_when_idle", &self.duration_to_sleep_when_idle)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct BusConfiguration {
    pub inbox: InboxQueueConfiguration,
    pub is_transactional: bool,
}

impl BusConfiguration {
    /// Every queue the configuration references
    pub fn queues(&self) -> Vec<Arc<dyn Queue>> {
        vec![
            Arc::clone(&self.inbox.work_queue),
            Arc::clone(&self.inbox.error_queue),
        ]
    }
}

/// Message bus owning a pool of inbox workers
///
/// `start` spawns `thread_count` workers. `stop` signals every worker to exit
/// at its next idle-sleep boundary, joins them, and detaches all event
/// subscriptions; calling it on a stopped bus is a no-op.
#[async_trait]
pub trait BusRuntime: Send + Sync {
    async fn start(&self) -> Result<(), BusError>;

    async fn stop(&self) -> Result<(), BusError>;

    /// Ask workers to exit without waiting for them
    ///
    /// Synchronous fallback for scopes that end without reaching `stop`.
    fn signal_stop(&self);

    fn message_factory(&self) -> &TransportMessageFactory;

    fn serializer(&self) -> Arc<dyn Serializer>;

    fn events(&self) -> &BusEvents;
}

/// Builds a bus over already-provisioned queues
pub trait BusBuilder: Send + Sync {
    fn build(&self, configuration: BusConfiguration) -> Result<Arc<dyn BusRuntime>, BusError>;
}
