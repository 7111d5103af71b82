// Port Layer - Interfaces for external collaborators

pub mod bus_events;
pub mod bus_runtime;
pub mod cpu_probe;
pub mod queue;
pub mod serializer;

// Re-exports
pub use bus_events::{BusEvents, Subscription, WorkerWaitingHandler};
pub use bus_runtime::{BusBuilder, BusConfiguration, BusError, BusRuntime, InboxQueueConfiguration};
pub use cpu_probe::{CpuProbe, ProbeError};
pub use queue::{Queue, QueueError, QueueFactory};
pub use serializer::{JsonSerializer, Serializer};
