//! Shared doubles for harness and bus tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use busload_core::application::bus::{shutdown_channel, Nap, ShutdownSender, ShutdownToken};
use busload_core::application::{
    HarnessConfig, QueueManager, ResourceTestCommand, ResourceUsageHarness, ServiceBus,
};
use busload_core::domain::{CpuSample, QueueAddress, TransportMessageFactory, WorkerId, WorkerWaiting};
use busload_core::port::{
    BusBuilder, BusConfiguration, BusError, BusEvents, BusRuntime, CpuProbe, JsonSerializer,
    ProbeError, Queue, Serializer,
};
use busload_infra_memory::{MemoryQueueFactory, MemoryQueueStore};

/// Queue manager over a store the test can inspect
pub struct Fixture {
    pub store: Arc<MemoryQueueStore>,
    pub queue_manager: Arc<QueueManager>,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(MemoryQueueStore::new());
        let queue_manager = QueueManager::new()
            .with_factory(Arc::new(MemoryQueueFactory::with_store(Arc::clone(&store))));
        Self {
            store,
            queue_manager: Arc::new(queue_manager),
        }
    }

    pub fn harness(&self, probe: Arc<dyn CpuProbe>, builder: Arc<dyn BusBuilder>) -> ResourceUsageHarness {
        ResourceUsageHarness::new(Arc::clone(&self.queue_manager), probe, builder)
    }

    pub fn queue_exists(&self, config: &HarnessConfig, name: &str) -> bool {
        let address = QueueAddress::parse(&config.queue_uri(name)).unwrap();
        self.store.has(&address)
    }

    pub fn queue(&self, uri: &str) -> Arc<dyn Queue> {
        self.queue_manager.get_queue(uri).unwrap()
    }
}

/// Poll `condition` every 5ms until it holds or `timeout` passes
pub async fn eventually(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

// ============================================================================
// Bus lifecycle accounting
// ============================================================================

#[derive(Debug, Default)]
pub struct LifecycleCounters {
    pub builds: AtomicUsize,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub signal_stops: AtomicUsize,
}

impl LifecycleCounters {
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn signal_stops(&self) -> usize {
        self.signal_stops.load(Ordering::SeqCst)
    }
}

/// Delegating bus that counts lifecycle calls
pub struct CountingBus {
    inner: Arc<dyn BusRuntime>,
    counters: Arc<LifecycleCounters>,
}

#[async_trait]
impl BusRuntime for CountingBus {
    async fn start(&self) -> Result<(), BusError> {
        self.counters.starts.fetch_add(1, Ordering::SeqCst);
        self.inner.start().await
    }

    async fn stop(&self) -> Result<(), BusError> {
        self.counters.stops.fetch_add(1, Ordering::SeqCst);
        self.inner.stop().await
    }

    fn signal_stop(&self) {
        self.counters.signal_stops.fetch_add(1, Ordering::SeqCst);
        self.inner.signal_stop()
    }

    fn message_factory(&self) -> &TransportMessageFactory {
        self.inner.message_factory()
    }

    fn serializer(&self) -> Arc<dyn Serializer> {
        self.inner.serializer()
    }

    fn events(&self) -> &BusEvents {
        self.inner.events()
    }
}

pub struct CountingBusBuilder<B> {
    inner: B,
    pub counters: Arc<LifecycleCounters>,
}

impl<B: BusBuilder> CountingBusBuilder<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            counters: Arc::new(LifecycleCounters::default()),
        }
    }
}

impl<B: BusBuilder> BusBuilder for CountingBusBuilder<B> {
    fn build(&self, configuration: BusConfiguration) -> Result<Arc<dyn BusRuntime>, BusError> {
        self.counters.builds.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.build(configuration)?;
        Ok(Arc::new(CountingBus {
            inner,
            counters: Arc::clone(&self.counters),
        }))
    }
}

/// Builds `ServiceBus`es and keeps a handle on the last one
#[derive(Default)]
pub struct RetainingBusBuilder {
    pub built: Arc<Mutex<Option<Arc<ServiceBus>>>>,
}

impl RetainingBusBuilder {
    pub fn last_built(built: &Mutex<Option<Arc<ServiceBus>>>) -> Option<Arc<ServiceBus>> {
        built.lock().unwrap().clone()
    }
}

impl BusBuilder for RetainingBusBuilder {
    fn build(&self, configuration: BusConfiguration) -> Result<Arc<dyn BusRuntime>, BusError> {
        let bus = Arc::new(ServiceBus::new(configuration));
        *self.built.lock().unwrap() = Some(Arc::clone(&bus));
        Ok(bus)
    }
}

/// Builder whose buses can never be created
pub struct FailingBusBuilder;

impl BusBuilder for FailingBusBuilder {
    fn build(&self, _configuration: BusConfiguration) -> Result<Arc<dyn BusRuntime>, BusError> {
        Err(BusError::StartFailed("transport unreachable".to_string()))
    }
}

// ============================================================================
// Scripted bus
// ============================================================================

/// Bus simulated by a single pump task
///
/// Every 5ms the pump drains the work queue and records the highest load
/// iteration it has seen. After a non-empty drain it reports every worker
/// idle, unless the drained load reached `stall_from_iteration`, in which case
/// the workers stay silent for good.
pub struct ScriptedBus {
    configuration: BusConfiguration,
    events: BusEvents,
    message_factory: TransportMessageFactory,
    serializer: Arc<dyn Serializer>,
    stall_from_iteration: u64,
    seen_iteration: Arc<AtomicU64>,
    undecodable: Arc<AtomicUsize>,
    running: Mutex<Option<(ShutdownSender, JoinHandle<()>)>>,
}

impl ScriptedBus {
    async fn pump(
        work_queue: Arc<dyn Queue>,
        events: BusEvents,
        serializer: Arc<dyn Serializer>,
        thread_count: usize,
        stall_from_iteration: u64,
        seen_iteration: Arc<AtomicU64>,
        undecodable: Arc<AtomicUsize>,
        mut shutdown: ShutdownToken,
    ) {
        loop {
            let mut drained = 0usize;
            while let Ok(Some(received)) = work_queue.dequeue() {
                drained += 1;
                let command = serializer
                    .deserialize(&received.stream)
                    .ok()
                    .and_then(|message| serde_json::from_slice::<ResourceTestCommand>(&message.message).ok());
                match command {
                    Some(command) => {
                        seen_iteration.fetch_max(command.iteration, Ordering::SeqCst);
                    }
                    None => {
                        undecodable.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }

            if drained > 0 && seen_iteration.load(Ordering::SeqCst) < stall_from_iteration {
                for index in 0..thread_count {
                    events.raise_worker_waiting(WorkerWaiting {
                        worker: WorkerId::new(index),
                    });
                }
            }

            if shutdown.nap(Duration::from_millis(5)).await == Nap::Interrupted {
                break;
            }
        }
    }
}

#[async_trait]
impl BusRuntime for ScriptedBus {
    async fn start(&self) -> Result<(), BusError> {
        let mut running = self.running.lock().unwrap();
        if running.is_some() {
            return Err(BusError::AlreadyStarted);
        }
        let (tx, token) = shutdown_channel();
        let handle = tokio::spawn(Self::pump(
            Arc::clone(&self.configuration.inbox.work_queue),
            self.events.clone(),
            Arc::clone(&self.serializer),
            self.configuration.inbox.thread_count,
            self.stall_from_iteration,
            Arc::clone(&self.seen_iteration),
            Arc::clone(&self.undecodable),
            token,
        ));
        *running = Some((tx, handle));
        Ok(())
    }

    async fn stop(&self) -> Result<(), BusError> {
        let running = self.running.lock().unwrap().take();
        if let Some((tx, handle)) = running {
            tx.shutdown();
            handle
                .await
                .map_err(|e| BusError::StopFailed(e.to_string()))?;
        }
        self.events.clear();
        Ok(())
    }

    fn signal_stop(&self) {
        if let Some((tx, _)) = self.running.lock().unwrap().as_ref() {
            tx.shutdown();
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

pub struct ScriptedBusBuilder {
    pub stall_from_iteration: u64,
    /// Highest load iteration drained so far
    pub seen_iteration: Arc<AtomicU64>,
    /// Drained messages that were not harness load
    pub undecodable: Arc<AtomicUsize>,
}

impl ScriptedBusBuilder {
    /// Workers report idle after every drain
    pub fn responsive() -> Self {
        Self::stalling_from(u64::MAX)
    }

    /// Workers go silent once they drain load from `iteration` onwards
    pub fn stalling_from(iteration: u64) -> Self {
        Self {
            stall_from_iteration: iteration,
            seen_iteration: Arc::new(AtomicU64::new(0)),
            undecodable: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl BusBuilder for ScriptedBusBuilder {
    fn build(&self, configuration: BusConfiguration) -> Result<Arc<dyn BusRuntime>, BusError> {
        Ok(Arc::new(ScriptedBus {
            configuration,
            events: BusEvents::new(),
            message_factory: TransportMessageFactory::new(),
            serializer: Arc::new(JsonSerializer),
            stall_from_iteration: self.stall_from_iteration,
            seen_iteration: Arc::clone(&self.seen_iteration),
            undecodable: Arc::clone(&self.undecodable),
            running: Mutex::new(None),
        }))
    }
}

// ============================================================================
// Probes
// ============================================================================

/// Calm until the bus has drained load from `breach_from`, then spiking
pub struct IterationGatedProbe {
    pub seen_iteration: Arc<AtomicU64>,
    pub breach_from: u64,
    pub calm: CpuSample,
    pub spike: CpuSample,
}

#[async_trait]
impl CpuProbe for IterationGatedProbe {
    async fn sample(&self) -> Result<CpuSample, ProbeError> {
        if self.seen_iteration.load(Ordering::SeqCst) >= self.breach_from {
            Ok(self.spike)
        } else {
            Ok(self.calm)
        }
    }

    fn settle_duration(&self) -> Duration {
        Duration::ZERO
    }
}
