use super::rows::{FailedWriteRow, WriteQueueRow};
use crate::domain::entities::{FailedWriteDigest, QueuedWrite, ReplayCandidate, UndecodableWrite};
use crate::domain::value_objects::{
    RecordId, TargetTable, WriteOperation, WritePayload, WriteQueueId, WriteStatus,
};
use crate::shared::error::AppError;
use chrono::{DateTime, NaiveDateTime, Utc};

pub fn queue_id_from_row(id: i64) -> Result<WriteQueueId, AppError> {
    WriteQueueId::new(id).map_err(AppError::Database)
}

/// Rows whose id is unusable are a store failure; any other decoding
/// problem is reported per entry.
pub fn replay_candidate_from_row(row: WriteQueueRow) -> Result<ReplayCandidate, AppError> {
    let id = queue_id_from_row(row.id)?;
    Ok(queued_write_from_row(id, row).map_err(|reason| UndecodableWrite { id, reason }))
}

pub fn queued_write_from_row(id: WriteQueueId, row: WriteQueueRow) -> Result<QueuedWrite, String> {
    let target_table = TargetTable::new(row.target_table)?;
    let operation = row.operation.parse::<WriteOperation>()?;
    let data = WritePayload::from_json_str(&row.data)?;
    let record_id = row.record_id.map(RecordId::new).transpose()?;
    let status = row.status.parse::<WriteStatus>()?;
    let created_at = parse_timestamp(&row.created_at)?;

    Ok(QueuedWrite::new(
        id,
        target_table,
        operation,
        data,
        record_id,
        status,
        created_at,
        row.error_message,
    ))
}

pub fn failed_digest_from_row(row: FailedWriteRow) -> Result<FailedWriteDigest, AppError> {
    Ok(FailedWriteDigest {
        id: queue_id_from_row(row.id)?,
        target_table: TargetTable::new(row.target_table).map_err(AppError::Database)?,
        operation: row
            .operation
            .parse::<WriteOperation>()
            .map_err(AppError::Database)?,
        error_message: row.error_message,
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("Invalid created_at {value:?}: {e}"))
}
