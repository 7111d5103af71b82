// CPU probe port - system-wide utilization sampling
// reason: async-trait for the baseline settle sleep
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::application::constants::BASELINE_SETTLE_DURATION;
use crate::domain::CpuSample;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("CPU counter unavailable: {0}")]
    PlatformUnavailable(String),
}

/// Samples system-wide CPU utilization
///
/// One instance owns one OS counter handle for its lifetime. The envelope is
/// relative to the host, so callers anchor on `baseline()` rather than an
/// absolute number.
#[async_trait]
pub trait CpuProbe: Send + Sync {
    /// Instantaneous system-wide CPU utilization in percent
    async fn sample(&self) -> Result<CpuSample, ProbeError>;

    /// Delay between the discarded first sample and the baseline sample
    fn settle_duration(&self) -> Duration {
        BASELINE_SETTLE_DURATION
    }

    /// Baseline sample for the envelope
    ///
    /// Cold counters read zero on their first invocation on some platforms, so
    /// the first sample is discarded.
    async fn baseline(&self) -> Result<CpuSample, ProbeError> {
        let _ = self.sample().await?;
        tokio::time::sleep(self.settle_duration()).await;
        self.sample().await
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed sequence of samples, repeating the last one forever
    pub struct ScriptedCpuProbe {
        samples: Vec<CpuSample>,
        cursor: AtomicUsize,
    }

    impl ScriptedCpuProbe {
        pub fn new(samples: Vec<CpuSample>) -> Self {
            Self {
                samples,
                cursor: AtomicUsize::new(0),
            }
        }

        /// Number of samples handed out so far
        pub fn calls(&self) -> usize {
            self.cursor.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CpuProbe for ScriptedCpuProbe {
        async fn sample(&self) -> Result<CpuSample, ProbeError> {
            let index = self.cursor.fetch_add(1, Ordering::SeqCst);
            self.samples
                .get(index)
                .or_else(|| self.samples.last())
                .copied()
                .ok_or_else(|| ProbeError::PlatformUnavailable("no scripted samples".to_string()))
        }

        fn settle_duration(&self) -> Duration {
            Duration::ZERO
        }
    }

    /// Probe on a host without a readable counter
    pub struct UnavailableCpuProbe;

    #[async_trait]
    impl CpuProbe for UnavailableCpuProbe {
        async fn sample(&self) -> Result<CpuSample, ProbeError> {
            Err(ProbeError::PlatformUnavailable(
                "counter not present".to_string(),
            ))
        }

        fn settle_duration(&self) -> Duration {
            Duration::ZERO
        }
    }
}
