// Harness configuration
use std::time::Duration;

use crate::application::constants::*;
use crate::domain::DomainError;

/// Options for one conformance run
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    /// Bus worker count
    pub thread_count: usize,
    /// Wall-clock window for the whole run
    pub duration: Duration,
    /// Messages enqueued per iteration before waiting for idle
    pub load_per_iteration: usize,
    /// Worker naps between empty polls; the last entry repeats
    pub idle_sleep_schedule: Vec<Duration>,
    /// Delay between CPU samples while waiting for idleness
    pub poll_interval: Duration,
    pub is_transactional: bool,
    /// URI format with exactly one `{}` placeholder
    pub queue_uri_template: String,
    /// Percentage points allowed above baseline
    pub margin: f32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            thread_count: DEFAULT_THREAD_COUNT,
            duration: DEFAULT_RUN_DURATION,
            load_per_iteration: DEFAULT_LOAD_PER_ITERATION,
            idle_sleep_schedule: vec![DEFAULT_IDLE_SLEEP_DURATION],
            poll_interval: DEFAULT_POLL_INTERVAL,
            is_transactional: false,
            queue_uri_template: DEFAULT_QUEUE_URI_TEMPLATE.to_string(),
            margin: DEFAULT_CPU_MARGIN,
        }
    }
}

impl HarnessConfig {
    /// # Errors
    /// `DomainError::InvalidConfig` describing the first offending option
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.thread_count < 1 {
            return Err(DomainError::InvalidConfig(
                "thread count must be at least 1".to_string(),
            ));
        }
        if self.duration.is_zero() {
            return Err(DomainError::InvalidConfig(
                "duration must be greater than zero".to_string(),
            ));
        }
        if self.idle_sleep_schedule.is_empty() {
            return Err(DomainError::InvalidConfig(
                "idle sleep schedule needs at least one entry".to_string(),
            ));
        }
        // max_observed starts at the baseline, so a zero margin can never pass
        if !self.margin.is_finite() || self.margin <= 0.0 {
            return Err(DomainError::InvalidConfig(format!(
                "margin must be a positive number, got {}",
                self.margin
            )));
        }
        let placeholders = self.queue_uri_template.matches(QUEUE_NAME_PLACEHOLDER).count();
        if placeholders != 1 {
            return Err(DomainError::InvalidConfig(format!(
                "queue uri template '{}' must contain exactly one '{}' placeholder, found {}",
                self.queue_uri_template, QUEUE_NAME_PLACEHOLDER, placeholders
            )));
        }
        Ok(())
    }

    /// Instantiate the URI template for a logical queue name
    pub fn queue_uri(&self, name: &str) -> String {
        self.queue_uri_template.replacen(QUEUE_NAME_PLACEHOLDER, name, 1)
    }
}
