// CPU probe implementation
// reason: sysinfo for cross-platform system monitoring
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use sysinfo::System;
use tracing::debug;

use busload_core::application::constants::BASELINE_SETTLE_DURATION;
use busload_core::domain::CpuSample;
use busload_core::port::cpu_probe::{CpuProbe, ProbeError};

/// System-wide CPU probe backed by sysinfo
///
/// Owns one `System` handle for its lifetime. sysinfo computes usage as the
/// delta between two refreshes, which is why the very first sample of a fresh
/// handle is meaningless and `baseline` discards it.
pub struct SysinfoCpuProbe {
    system: Mutex<System>,
    settle: Duration,
}

impl SysinfoCpuProbe {
    /// Open the CPU counter
    ///
    /// # Example
    /// ```ignore
    /// let probe = SysinfoCpuProbe::new();
    /// let baseline = probe.baseline().await?;
    /// ```
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu();
        Self {
            system: Mutex::new(system),
            settle: BASELINE_SETTLE_DURATION,
        }
    }

    /// Override the delay between the discarded sample and the baseline
    pub fn with_settle_duration(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    fn read(&self) -> Result<CpuSample, ProbeError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(ProbeError::PlatformUnavailable(
                "sysinfo does not support this platform".to_string(),
            ));
        }

        let mut sys = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        sys.refresh_cpu();

        if sys.cpus().is_empty() {
            return Err(ProbeError::PlatformUnavailable(
                "no CPU counters exposed".to_string(),
            ));
        }

        let usage = sys.global_cpu_info().cpu_usage();
        if !usage.is_finite() {
            return Err(ProbeError::PlatformUnavailable(format!(
                "CPU counter returned {}",
                usage
            )));
        }

        debug!(cpu = %usage, cpus = sys.cpus().len(), "CPU sample collected");

        Ok(usage.max(0.0))
    }
}

impl Default for SysinfoCpuProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CpuProbe for SysinfoCpuProbe {
    async fn sample(&self) -> Result<CpuSample, ProbeError> {
        self.read()
    }

    fn settle_duration(&self) -> Duration {
        self.settle
    }
}
