use crate::domain::value_objects::{RecordId, TargetTable, WritePayload};
use serde::{Deserialize, Serialize};

/// Authoritative row-level change delivered by the read path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RowChange {
    Upsert { table: TargetTable, row: WritePayload },
    Delete { table: TargetTable, id: RecordId },
}

impl RowChange {
    pub fn table(&self) -> &TargetTable {
        match self {
            RowChange::Upsert { table, .. } => table,
            RowChange::Delete { table, .. } => table,
        }
    }
}
