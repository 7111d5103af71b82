// CPU Envelope Domain Model

use serde::{Deserialize, Serialize};

/// System-wide CPU utilization in percent
pub type CpuSample = f32;

/// Derive the envelope limit from a baseline sample
pub fn limit_from(baseline: CpuSample, margin: f32) -> CpuSample {
    baseline + margin
}

/// Allowed CPU band `[0, baseline + margin)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    baseline: CpuSample,
    margin: f32,
    limit: CpuSample,
}

impl Envelope {
    pub fn new(baseline: CpuSample, margin: f32) -> Self {
        Self {
            baseline,
            margin,
            limit: limit_from(baseline, margin),
        }
    }

    pub fn baseline(&self) -> CpuSample {
        self.baseline
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn limit(&self) -> CpuSample {
        self.limit
    }

    /// A sample equal to the limit is a breach
    pub fn admits(&self, sample: CpuSample) -> bool {
        sample < self.limit
    }
}
