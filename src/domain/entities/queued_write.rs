use crate::domain::value_objects::{
    RecordId, TargetTable, WriteOperation, WritePayload, WriteQueueId, WriteStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One durable, intended mutation awaiting replay against the remote API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueuedWrite {
    pub id: WriteQueueId,
    pub target_table: TargetTable,
    pub operation: WriteOperation,
    pub data: WritePayload,
    pub record_id: Option<RecordId>,
    pub status: WriteStatus,
    pub created_at: DateTime<Utc>,
    pub error_message: Option<String>,
}

impl QueuedWrite {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: WriteQueueId,
        target_table: TargetTable,
        operation: WriteOperation,
        data: WritePayload,
        record_id: Option<RecordId>,
        status: WriteStatus,
        created_at: DateTime<Utc>,
        error_message: Option<String>,
    ) -> Self {
        Self {
            id,
            target_table,
            operation,
            data,
            record_id,
            status,
            created_at,
            error_message,
        }
    }

    /// Record id for update/delete. Its absence is a local programming error.
    pub fn required_record_id(&self) -> Result<&RecordId, String> {
        self.record_id
            .as_ref()
            .ok_or_else(|| format!("record_id required for {}", self.operation))
    }
}

/// Queue row whose stored columns could not be decoded into a [`QueuedWrite`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UndecodableWrite {
    pub id: WriteQueueId,
    pub reason: String,
}

/// A replayable queue row, decoded or not. Decoding happens per entry so one
/// corrupt row cannot block the rest of the pass.
pub type ReplayCandidate = Result<QueuedWrite, UndecodableWrite>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(operation: WriteOperation, record_id: Option<&str>) -> QueuedWrite {
        QueuedWrite::new(
            WriteQueueId::new(1).unwrap(),
            TargetTable::new("todos").unwrap(),
            operation,
            WritePayload::empty(),
            record_id.map(|id| RecordId::new(id).unwrap()),
            WriteStatus::Pending,
            Utc::now(),
            None,
        )
    }

    #[test]
    fn missing_record_id_names_the_operation() {
        let err = sample(WriteOperation::Update, None)
            .required_record_id()
            .unwrap_err();
        assert_eq!(err, "record_id required for update");

        let err = sample(WriteOperation::Delete, None)
            .required_record_id()
            .unwrap_err();
        assert_eq!(err, "record_id required for delete");
    }

    #[test]
    fn present_record_id_is_returned() {
        let write = sample(WriteOperation::Update, Some("T1"));
        assert_eq!(write.required_record_id().unwrap().as_str(), "T1");
    }
}
