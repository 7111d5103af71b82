// Synthetic load command
use serde::{Deserialize, Serialize};

use crate::application::constants::RESOURCE_TEST_TEXT;

/// Payload of every message the harness enqueues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTestCommand {
    pub text: String,
    pub iteration: u64,
    pub sequence: usize,
}

impl ResourceTestCommand {
    pub fn new(iteration: u64, sequence: usize) -> Self {
        Self {
            text: RESOURCE_TEST_TEXT.to_string(),
            iteration,
            sequence,
        }
    }
}
