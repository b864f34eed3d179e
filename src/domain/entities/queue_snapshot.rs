use crate::domain::value_objects::{TargetTable, WriteOperation, WriteQueueId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailedWriteDigest {
    pub id: WriteQueueId,
    pub target_table: TargetTable,
    pub operation: WriteOperation,
    pub error_message: Option<String>,
}

/// Durable queue state as seen by a sync-status indicator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueueSnapshot {
    pub pending_count: u32,
    pub error_count: u32,
    pub failed_writes: Vec<FailedWriteDigest>,
}

impl QueueSnapshot {
    pub fn is_drained(&self) -> bool {
        self.pending_count == 0 && self.error_count == 0
    }
}
