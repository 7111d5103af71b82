//! Resource-usage harness
//!
//! Drives a bus worker pool through repeated load/idle iterations and checks
//! that system-wide CPU stays below `baseline + margin` while workers park.
//!
//! One run:
//! 1. provision the inbox work and error queues (drop, create, purge)
//! 2. take the CPU baseline
//! 3. build and start the bus, subscribe the idle adapter
//! 4. until the deadline: enqueue load, reset the idle set, sample CPU until
//!    every worker has reported `WorkerWaiting`
//! 5. stop the bus (exactly once) and drop the queues on every exit path
//!
//! Dropping the `run` future part-way signals the workers to stop without
//! joining them and drops the test queues synchronously.

mod command;
mod config;
mod report;

pub use command::ResourceTestCommand;
pub use config::HarnessConfig;
pub use report::{RunOutcome, RunReport};

use std::sync::Arc;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use crate::application::constants::{ERROR_QUEUE_NAME, INBOX_WORK_QUEUE_NAME};
use crate::application::idle_signal::IdleSignalAdapter;
use crate::application::idle_tracker::IdleThreadTracker;
use crate::application::queue_manager::QueueManager;
use crate::domain::{CpuSample, DomainError, Envelope};
use crate::error::{AppError, Result};
use crate::port::{
    BusBuilder, BusConfiguration, BusError, BusRuntime, CpuProbe, InboxQueueConfiguration,
};

/// Figures collected while a run progresses
#[derive(Debug, Default)]
struct RunProgress {
    iterations: u64,
    baseline: CpuSample,
    limit: CpuSample,
    max_observed: CpuSample,
    inconclusive: bool,
}

/// Started bus that is stopped exactly once
///
/// `stop` is the normal path. If the run future is dropped before reaching it,
/// `Drop` falls back to the synchronous stop signal.
struct RunningBus {
    bus: Arc<dyn BusRuntime>,
    stopped: bool,
}

impl RunningBus {
    async fn start(bus: Arc<dyn BusRuntime>) -> std::result::Result<Self, BusError> {
        bus.start().await?;
        Ok(Self { bus, stopped: false })
    }

    fn bus(&self) -> &dyn BusRuntime {
        self.bus.as_ref()
    }

    async fn stop(mut self) -> std::result::Result<(), BusError> {
        self.stopped = true;
        self.bus.stop().await
    }
}

impl Drop for RunningBus {
    fn drop(&mut self) {
        if !self.stopped {
            warn!("Run abandoned with bus running, signalling stop");
            self.bus.signal_stop();
        }
    }
}

/// Test queues that are dropped exactly once
///
/// `release` is the normal path and reports failures. A run cancelled before
/// reaching it still drops the queues from `Drop`, ignoring errors.
struct ProvisionedQueues {
    configuration: BusConfiguration,
    released: bool,
}

impl ProvisionedQueues {
    fn configuration(&self) -> &BusConfiguration {
        &self.configuration
    }

    fn release(mut self) -> Result<()> {
        self.released = true;
        for queue in self.configuration.queues() {
            queue.drop_queue()?;
            debug!(queue = %queue.uri(), "Test queue dropped");
        }
        Ok(())
    }
}

impl Drop for ProvisionedQueues {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        warn!("Test queues not released, dropping them");
        for queue in self.configuration.queues() {
            if let Err(e) = queue.drop_queue() {
                warn!(queue = %queue.uri(), error = %e, "Failed to drop test queue");
            }
        }
    }
}

/// Resource-usage conformance harness
pub struct ResourceUsageHarness {
    queue_manager: Arc<QueueManager>,
    cpu_probe: Arc<dyn CpuProbe>,
    bus_builder: Arc<dyn BusBuilder>,
}

impl ResourceUsageHarness {
    pub fn new(
        queue_manager: Arc<QueueManager>,
        cpu_probe: Arc<dyn CpuProbe>,
        bus_builder: Arc<dyn BusBuilder>,
    ) -> Self {
        Self {
            queue_manager,
            cpu_probe,
            bus_builder,
        }
    }

    /// Execute one conformance run
    ///
    /// Never fails; every error ends up in `RunReport::outcome`.
    pub async fn run(&self, config: &HarnessConfig) -> RunReport {
        let mut progress = RunProgress::default();

        let outcome = match self.execute(config, &mut progress).await {
            Ok(()) => RunOutcome::Pass,
            Err(e) => {
                error!(error = %e, iteration = progress.iterations, "Resource usage run failed");
                RunOutcome::from(e)
            }
        };

        info!(
            iterations = progress.iterations,
            baseline = progress.baseline,
            limit = progress.limit,
            max_observed = progress.max_observed,
            inconclusive = progress.inconclusive,
            outcome = %outcome,
            "[done] resource usage run"
        );

        RunReport {
            iterations: progress.iterations,
            max_observed: progress.max_observed,
            limit: progress.limit,
            baseline: progress.baseline,
            inconclusive: progress.inconclusive,
            outcome,
        }
    }

    async fn execute(&self, config: &HarnessConfig, progress: &mut RunProgress) -> Result<()> {
        config.validate()?;

        // The baseline settle time counts against the run window
        let deadline = Instant::now().checked_add(config.duration).ok_or_else(|| {
            DomainError::InvalidConfig(format!(
                "duration {:?} is too large for a run deadline",
                config.duration
            ))
        })?;

        let queues = self.provision(config)?;
        let measured = self
            .measure(config, queues.configuration(), deadline, progress)
            .await;
        let dropped = queues.release();

        // The run's own failure wins over a teardown failure
        measured?;
        dropped
    }

    /// Drop, create, then purge both test queues
    fn provision(&self, config: &HarnessConfig) -> Result<ProvisionedQueues> {
        let work_queue = self
            .queue_manager
            .get_queue(&config.queue_uri(INBOX_WORK_QUEUE_NAME))?;
        let error_queue = self
            .queue_manager
            .get_queue(&config.queue_uri(ERROR_QUEUE_NAME))?;

        let configuration = BusConfiguration {
            inbox: InboxQueueConfiguration {
                work_queue,
                error_queue,
                thread_count: config.thread_count,
                duration_to_sleep_when_idle: config.idle_sleep_schedule.clone(),
            },
            is_transactional: config.is_transactional,
        };

        for queue in configuration.queues() {
            queue.drop_queue()?;
        }

        // Guarded from here on: a failed create or purge still drops the queues
        let queues = ProvisionedQueues {
            configuration,
            released: false,
        };
        let configuration = queues.configuration();

        self.queue_manager.create_physical_queues(configuration)?;

        for queue in configuration.queues() {
            queue.purge()?;
        }

        info!(
            work_queue = %configuration.inbox.work_queue.uri(),
            error_queue = %configuration.inbox.error_queue.uri(),
            "Test queues provisioned"
        );
        Ok(queues)
    }

    async fn measure(
        &self,
        config: &HarnessConfig,
        configuration: &BusConfiguration,
        deadline: Instant,
        progress: &mut RunProgress,
    ) -> Result<()> {
        let baseline = self.cpu_probe.baseline().await?;
        let envelope = Envelope::new(baseline, config.margin);
        progress.baseline = baseline;
        progress.limit = envelope.limit();
        progress.max_observed = baseline;

        info!(baseline, limit = envelope.limit(), "CPU envelope established");

        let bus = self.bus_builder.build(configuration.clone())?;
        let running = RunningBus::start(bus).await?;

        let tracker = Arc::new(IdleThreadTracker::new());
        let subscription = IdleSignalAdapter::attach(Arc::clone(&tracker), running.bus().events());

        let result = self
            .iterate(config, configuration, running.bus(), &tracker, &envelope, deadline, progress)
            .await;

        let stopped = running.stop().await;
        drop(subscription);

        result?;
        stopped?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn iterate(
        &self,
        config: &HarnessConfig,
        configuration: &BusConfiguration,
        bus: &dyn BusRuntime,
        tracker: &IdleThreadTracker,
        envelope: &Envelope,
        deadline: Instant,
        progress: &mut RunProgress,
    ) -> Result<()> {
        let work_queue = &configuration.inbox.work_queue;
        let serializer = bus.serializer();

        'run: while Instant::now() < deadline {
            progress.iterations += 1;
            let iteration = progress.iterations;

            for sequence in 0..config.load_per_iteration {
                let command = ResourceTestCommand::new(iteration, sequence);
                let message = bus.message_factory().create(&command, |c| {
                    c.with_recipient(work_queue.uri().clone());
                })?;
                let stream = serializer.serialize(&message)?;
                work_queue.enqueue(&message, stream)?;
            }

            // Signals raised from here on count, even ones that beat the
            // workers to the fresh load
            tracker.reset();

            info!(iteration, "[checking usage]");

            while tracker.size() < config.thread_count {
                if Instant::now() >= deadline {
                    progress.inconclusive = true;
                    warn!(
                        iteration,
                        idle = tracker.size(),
                        thread_count = config.thread_count,
                        "Deadline reached before all workers parked"
                    );
                    break 'run;
                }

                let cpu = self.cpu_probe.sample().await?;
                if cpu > progress.max_observed {
                    progress.max_observed = cpu;
                }

                if !envelope.admits(cpu) {
                    return Err(AppError::EnvelopeExceeded {
                        observed: cpu,
                        limit: envelope.limit(),
                        iteration,
                    });
                }

                sleep(config.poll_interval).await;
            }

            debug!(iteration, "All workers parked");
        }

        Ok(())
    }
}
