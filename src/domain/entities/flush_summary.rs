use serde::{Deserialize, Serialize};

/// Outcome counts of one flush pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlushSummary {
    pub processed: u32,
    pub failed: u32,
}

impl FlushSummary {
    pub fn new(processed: u32, failed: u32) -> Self {
        Self { processed, failed }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn attempted(&self) -> u32 {
        self.processed + self.failed
    }
}
