// Domain Layer - Pure data model for queues, messages, workers and the CPU envelope

pub mod envelope;
pub mod error;
pub mod message;
pub mod queue;
pub mod worker;

// Re-exports
pub use envelope::{limit_from, CpuSample, Envelope};
pub use error::DomainError;
pub use message::{
    ReceivedMessage, TransportMessage, TransportMessageConfigurator, TransportMessageFactory,
};
pub use queue::QueueAddress;
pub use worker::{WorkerId, WorkerState, WorkerWaiting};
