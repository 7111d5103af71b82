// Central Error Type for the Application

use thiserror::Error;

use crate::domain::CpuSample;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Queue error: {0}")]
    Queue(#[from] crate::port::QueueError),

    #[error("Probe error: {0}")]
    Probe(#[from] crate::port::ProbeError),

    #[error("Bus lifecycle error: {0}")]
    Bus(#[from] crate::port::BusError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("[EXCEEDED] : cpu usage = {observed} / limit = {limit} (iteration {iteration})")]
    EnvelopeExceeded {
        observed: CpuSample,
        limit: CpuSample,
        iteration: u64,
    },
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
