// Run report and outcome
use serde::Serialize;
use std::fmt;

use crate::domain::{CpuSample, DomainError};
use crate::error::AppError;
use crate::port::{ProbeError, QueueError};

/// Terminal state of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
    Pass,
    EnvelopeExceeded {
        observed: CpuSample,
        limit: CpuSample,
        iteration: u64,
    },
    /// CPU counter unreadable; the run is skipped, not failed
    PlatformUnavailable(String),
    InvalidConfig(String),
    InvalidAddress(String),
    BusLifecycleFailure(String),
    QueueFailure(String),
}

impl RunOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, RunOutcome::Pass)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RunOutcome::PlatformUnavailable(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_pass() && !self.is_skipped()
    }

    /// Process exit code: 0 pass or skip, 1 envelope breach, 2 anything else
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Pass | RunOutcome::PlatformUnavailable(_) => 0,
            RunOutcome::EnvelopeExceeded { .. } => 1,
            _ => 2,
        }
    }
}

impl From<AppError> for RunOutcome {
    fn from(err: AppError) -> Self {
        match err {
            AppError::EnvelopeExceeded {
                observed,
                limit,
                iteration,
            } => RunOutcome::EnvelopeExceeded {
                observed,
                limit,
                iteration,
            },
            AppError::Domain(DomainError::InvalidConfig(msg)) => RunOutcome::InvalidConfig(msg),
            AppError::Domain(DomainError::InvalidAddress(msg))
            | AppError::Queue(QueueError::Address(DomainError::InvalidAddress(msg))) => {
                RunOutcome::InvalidAddress(msg)
            }
            AppError::Queue(QueueError::Address(DomainError::InvalidConfig(msg))) => {
                RunOutcome::InvalidConfig(msg)
            }
            AppError::Queue(e) => RunOutcome::QueueFailure(e.to_string()),
            AppError::Probe(ProbeError::PlatformUnavailable(msg)) => {
                RunOutcome::PlatformUnavailable(msg)
            }
            AppError::Bus(e) => RunOutcome::BusLifecycleFailure(e.to_string()),
            AppError::Serialization(e) => RunOutcome::QueueFailure(e.to_string()),
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Pass => write!(f, "PASS"),
            RunOutcome::EnvelopeExceeded {
                observed,
                limit,
                iteration,
            } => write!(
                f,
                "ENVELOPE_EXCEEDED: cpu usage = {} / limit = {} at iteration {}",
                observed, limit, iteration
            ),
            RunOutcome::PlatformUnavailable(msg) => write!(f, "PLATFORM_UNAVAILABLE: {}", msg),
            RunOutcome::InvalidConfig(msg) => write!(f, "INVALID_CONFIG: {}", msg),
            RunOutcome::InvalidAddress(msg) => write!(f, "INVALID_ADDRESS: {}", msg),
            RunOutcome::BusLifecycleFailure(msg) => write!(f, "BUS_LIFECYCLE_FAILURE: {}", msg),
            RunOutcome::QueueFailure(msg) => write!(f, "QUEUE_FAILURE: {}", msg),
        }
    }
}

/// Result of one conformance run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub iterations: u64,
    pub max_observed: CpuSample,
    pub limit: CpuSample,
    pub baseline: CpuSample,
    /// The deadline cut the last iteration short before every worker parked
    pub inconclusive: bool,
    pub outcome: RunOutcome,
}
