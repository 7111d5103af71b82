// Inbox worker - dequeue loop with idle signalling

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, trace, warn};

use super::shutdown::{Nap, ShutdownToken};
use crate::application::constants::ERROR_RECOVERY_SLEEP_DURATION;
use crate::domain::{ReceivedMessage, WorkerId, WorkerState, WorkerWaiting};
use crate::port::{BusEvents, InboxQueueConfiguration, Queue, Serializer};

/// One inbox consumer
///
/// Emits `WorkerWaiting` each time it finds the work queue empty, right before
/// napping. The nap length walks the idle schedule and saturates at its last
/// entry; handling a message starts the schedule over.
pub(crate) struct InboxWorker {
    id: WorkerId,
    work_queue: Arc<dyn Queue>,
    error_queue: Arc<dyn Queue>,
    idle_schedule: Vec<Duration>,
    serializer: Arc<dyn Serializer>,
    events: BusEvents,
    is_transactional: bool,
}

impl InboxWorker {
    pub(crate) fn new(
        id: WorkerId,
        inbox: &InboxQueueConfiguration,
        serializer: Arc<dyn Serializer>,
        events: BusEvents,
        is_transactional: bool,
    ) -> Self {
        Self {
            id,
            work_queue: Arc::clone(&inbox.work_queue),
            error_queue: Arc::clone(&inbox.error_queue),
            idle_schedule: inbox.duration_to_sleep_when_idle.clone(),
            serializer,
            events,
            is_transactional,
        }
    }

    /// Run until shutdown is observed at a nap boundary
    pub(crate) async fn run(self, mut shutdown: ShutdownToken) {
        let mut state = WorkerState::Starting;
        let mut idle_step = 0usize;
        debug!(worker = %self.id, transactional = self.is_transactional, "Worker started");

        loop {
            if shutdown.is_shutdown() {
                break;
            }

            let nap = match self.work_queue.dequeue() {
                Ok(Some(received)) => {
                    self.transition(&mut state, WorkerState::Busy);
                    idle_step = 0;
                    self.handle(received);
                    continue;
                }
                Ok(None) => {
                    self.transition(&mut state, WorkerState::Idle);
                    self.events.raise_worker_waiting(WorkerWaiting { worker: self.id });
                    let nap = self.idle_duration(idle_step);
                    idle_step = idle_step.saturating_add(1);
                    nap
                }
                Err(e) => {
                    error!(worker = %self.id, error = %e, "Worker failed to dequeue");
                    ERROR_RECOVERY_SLEEP_DURATION
                }
            };

            if shutdown.nap(nap).await == Nap::Interrupted {
                break;
            }
        }

        self.transition(&mut state, WorkerState::Stopping);
        debug!(worker = %self.id, "Worker stopped");
    }

    fn transition(&self, state: &mut WorkerState, next: WorkerState) {
        if *state != next {
            trace!(worker = %self.id, from = %state, to = %next, "Worker state changed");
            *state = next;
        }
    }

    fn idle_duration(&self, step: usize) -> Duration {
        let last = self.idle_schedule.len().saturating_sub(1);
        self.idle_schedule
            .get(step.min(last))
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    fn handle(&self, received: ReceivedMessage) {
        match self.serializer.deserialize(&received.stream) {
            Ok(message) => {
                debug!(
                    worker = %self.id,
                    message_id = %message.message_id,
                    message_type = %message.message_type,
                    "Message handled"
                );
            }
            Err(e) => {
                warn!(
                    worker = %self.id,
                    message_id = %received.message_id,
                    error = %e,
                    "Undecodable message, moving to error queue"
                );
                if let Err(e) = self
                    .error_queue
                    .enqueue_stream(received.message_id, received.stream)
                {
                    error!(worker = %self.id, error = %e, "Failed to route message to error queue");
                }
            }
        }
    }
}
