// Service bus - reference worker-pool runtime over Queue handles

mod shutdown;
mod worker;

pub use shutdown::{shutdown_channel, Nap, ShutdownSender, ShutdownToken};

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::{TransportMessageFactory, WorkerId};
use crate::port::{
    BusBuilder, BusConfiguration, BusError, BusEvents, BusRuntime, JsonSerializer, Serializer,
};
use worker::InboxWorker;

struct RunningWorkers {
    shutdown: ShutdownSender,
    handles: Vec<JoinHandle<()>>,
}

/// Inbox worker pool
///
/// Workers are tokio tasks; each gets the `WorkerId` of its index in the pool.
pub struct ServiceBus {
    configuration: BusConfiguration,
    events: BusEvents,
    message_factory: TransportMessageFactory,
    serializer: Arc<dyn Serializer>,
    running: Mutex<Option<RunningWorkers>>,
}

impl ServiceBus {
    pub fn new(configuration: BusConfiguration) -> Self {
        Self::with_serializer(configuration, Arc::new(JsonSerializer))
    }

    pub fn with_serializer(configuration: BusConfiguration, serializer: Arc<dyn Serializer>) -> Self {
        Self {
            configuration,
            events: BusEvents::new(),
            message_factory: TransportMessageFactory::new(),
            serializer,
            running: Mutex::new(None),
        }
    }

    pub fn configuration(&self) -> &BusConfiguration {
        &self.configuration
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Worker tasks that have not finished yet
    pub fn active_workers(&self) -> usize {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, |workers| {
                workers.handles.iter().filter(|h| !h.is_finished()).count()
            })
    }

    fn validate(&self) -> Result<(), BusError> {
        let inbox = &self.configuration.inbox;
        if inbox.thread_count == 0 {
            return Err(BusError::Configuration(
                "inbox thread count must be at least 1".to_string(),
            ));
        }
        if inbox.duration_to_sleep_when_idle.is_empty() {
            return Err(BusError::Configuration(
                "inbox idle sleep schedule is empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl BusRuntime for ServiceBus {
    async fn start(&self) -> Result<(), BusError> {
        self.validate()?;

        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.is_some() {
            return Err(BusError::AlreadyStarted);
        }

        if !self.configuration.inbox.work_queue.exists() {
            return Err(BusError::StartFailed(format!(
                "work queue '{}' does not exist",
                self.configuration.inbox.work_queue.uri()
            )));
        }

        let inbox = &self.configuration.inbox;
        let (shutdown, token) = shutdown_channel();
        let handles = (0..inbox.thread_count)
            .map(|index| {
                let worker = InboxWorker::new(
                    WorkerId::new(index),
                    inbox,
                    Arc::clone(&self.serializer),
                    self.events.clone(),
                    self.configuration.is_transactional,
                );
                tokio::spawn(worker.run(token.clone()))
            })
            .collect();

        *running = Some(RunningWorkers { shutdown, handles });

        info!(
            work_queue = %inbox.work_queue.uri(),
            thread_count = inbox.thread_count,
            transactional = self.configuration.is_transactional,
            "Service bus started"
        );
        Ok(())
    }

    async fn stop(&self) -> Result<(), BusError> {
        let workers = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(workers) = workers else {
            return Ok(());
        };

        workers.shutdown.shutdown();

        let mut panicked = 0usize;
        for handle in workers.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Worker did not finish cleanly");
                panicked += 1;
            }
        }

        self.events.clear();

        if panicked > 0 {
            return Err(BusError::StopFailed(format!(
                "{} worker(s) did not finish cleanly",
                panicked
            )));
        }

        info!("Service bus stopped");
        Ok(())
    }

    fn signal_stop(&self) {
        if let Some(workers) = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            warn!("Service bus stop signalled without join");
            workers.shutdown.shutdown();
        }
    }

    fn message_factory(&self) -> &TransportMessageFactory {
        &self.message_factory
    }

    fn serializer(&self) -> Arc<dyn Serializer> {
        Arc::clone(&self.serializer)
    }

    fn events(&self) -> &BusEvents {
        &self.events
    }
}

impl Drop for ServiceBus {
    fn drop(&mut self) {
        self.signal_stop();
    }
}

/// Builds `ServiceBus` instances (production)
#[derive(Debug, Default, Clone, Copy)]
pub struct ServiceBusBuilder;

impl BusBuilder for ServiceBusBuilder {
    fn build(&self, configuration: BusConfiguration) -> Result<Arc<dyn BusRuntime>, BusError> {
        Ok(Arc::new(ServiceBus::new(configuration)))
    }
}
