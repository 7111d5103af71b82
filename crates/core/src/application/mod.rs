// Application Layer - Harness orchestration and the reference bus

pub mod bus;
pub mod constants;
pub mod harness;
pub mod idle_signal;
pub mod idle_tracker;
pub mod queue_manager;

// Re-exports
pub use bus::{ServiceBus, ServiceBusBuilder};
pub use harness::{HarnessConfig, ResourceTestCommand, ResourceUsageHarness, RunOutcome, RunReport};
pub use idle_signal::IdleSignalAdapter;
pub use idle_tracker::IdleThreadTracker;
pub use queue_manager::QueueManager;
