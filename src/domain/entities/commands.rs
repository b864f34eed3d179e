use crate::domain::value_objects::{RecordId, TargetTable, WriteOperation, WritePayload};
use serde::{Deserialize, Serialize};

/// Intent recorded by the enqueuer.
///
/// `record_id` is optional for every operation: an update or
/// delete without one is accepted here and fails at flush time instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WriteDraft {
    pub target_table: TargetTable,
    pub operation: WriteOperation,
    pub data: WritePayload,
    pub record_id: Option<RecordId>,
}

impl WriteDraft {
    pub fn new(
        target_table: TargetTable,
        operation: WriteOperation,
        data: WritePayload,
        record_id: Option<RecordId>,
    ) -> Self {
        Self {
            target_table,
            operation,
            data,
            record_id,
        }
    }

    pub fn insert(target_table: TargetTable, record: WritePayload) -> Self {
        let record_id = record
            .get("id")
            .and_then(|value| value.as_str())
            .and_then(|id| RecordId::new(id).ok());
        Self::new(target_table, WriteOperation::Insert, record, record_id)
    }

    pub fn update(target_table: TargetTable, record_id: RecordId, patch: WritePayload) -> Self {
        Self::new(target_table, WriteOperation::Update, patch, Some(record_id))
    }

    pub fn delete(target_table: TargetTable, record_id: RecordId) -> Self {
        Self::new(
            target_table,
            WriteOperation::Delete,
            WritePayload::empty(),
            Some(record_id),
        )
    }
}

/// Optimistic change applied to a local replicated table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LocalMutation {
    /// Insert the full row, replacing any row with the same primary key.
    Upsert { table: TargetTable, row: WritePayload },
    /// Set the given columns on the row with this primary key.
    Patch {
        table: TargetTable,
        id: RecordId,
        changes: WritePayload,
    },
    Delete { table: TargetTable, id: RecordId },
}

impl LocalMutation {
    pub fn table(&self) -> &TargetTable {
        match self {
            LocalMutation::Upsert { table, .. } => table,
            LocalMutation::Patch { table, .. } => table,
            LocalMutation::Delete { table, .. } => table,
        }
    }
}
