use super::mappers::{
    failed_digest_from_row, queue_id_from_row, queued_write_from_row, replay_candidate_from_row,
};
use super::queries::*;
use super::rows::{FailedWriteRow, StatusCountRow, WriteQueueRow};
use crate::application::ports::write_queue_store::WriteQueueStore;
use crate::domain::entities::{
    LocalMutation, QueueSnapshot, QueuedWrite, ReplayCandidate, WriteDraft,
};
use crate::domain::value_objects::{WriteQueueId, WriteStatus};
use crate::infrastructure::database::table_writer;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::{SqliteConnection, SqlitePool};

const FAILED_WRITES_IN_SNAPSHOT: i64 = 50;

/// Write queue persisted in the `_write_queue` table.
pub struct SqliteWriteQueueStore {
    pool: SqlitePool,
}

impl SqliteWriteQueueStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn insert_draft(
        conn: &mut SqliteConnection,
        draft: &WriteDraft,
    ) -> Result<WriteQueueId, AppError> {
        let data = draft.data.to_json_string()?;
        let result = sqlx::query(INSERT_WRITE)
            .bind(draft.target_table.as_str())
            .bind(draft.operation.as_str())
            .bind(data)
            .bind(draft.record_id.as_ref().map(|id| id.as_str().to_string()))
            .bind(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
            .execute(&mut *conn)
            .await?;
        queue_id_from_row(result.last_insert_rowid())
    }

    /// Moves an entry to `next` when its current status allows it. Unknown
    /// ids and refused transitions leave the row untouched.
    async fn transition(
        &self,
        id: WriteQueueId,
        next: WriteStatus,
        message: Option<&str>,
    ) -> Result<(), AppError> {
        let current: Option<String> = sqlx::query_scalar(SELECT_WRITE_STATUS)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;
        let Some(current) = current else {
            tracing::debug!(
                target: "sync::write_queue",
                id = id.value(),
                to = %next,
                "status change for unknown write ignored"
            );
            return Ok(());
        };
        let current = current.parse::<WriteStatus>().map_err(AppError::Database)?;
        if !current.can_transition_to(next) {
            tracing::debug!(
                target: "sync::write_queue",
                id = id.value(),
                from = %current,
                to = %next,
                "status change refused"
            );
            return Ok(());
        }

        // compare-and-set on the status read above
        sqlx::query(UPDATE_WRITE_STATUS)
            .bind(id.value())
            .bind(next.as_str())
            .bind(message)
            .bind(current.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl WriteQueueStore for SqliteWriteQueueStore {
    async fn enqueue(&self, draft: WriteDraft) -> Result<WriteQueueId, AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::insert_draft(&mut conn, &draft).await
    }

    async fn enqueue_batch_with_local(
        &self,
        changes: Vec<(LocalMutation, WriteDraft)>,
    ) -> Result<Vec<WriteQueueId>, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(changes.len());
        for (mutation, draft) in &changes {
            table_writer::apply_local_mutation(&mut tx, mutation).await?;
            ids.push(Self::insert_draft(&mut tx, draft).await?);
        }
        tx.commit().await?;
        Ok(ids)
    }

    async fn replayable_writes(&self) -> Result<Vec<ReplayCandidate>, AppError> {
        let [first, second] = WriteStatus::REPLAYABLE;
        let rows = sqlx::query_as::<_, WriteQueueRow>(SELECT_REPLAYABLE_WRITES)
            .bind(first.as_str())
            .bind(second.as_str())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(replay_candidate_from_row).collect()
    }

    async fn mark_completed(&self, id: WriteQueueId) -> Result<(), AppError> {
        self.transition(id, WriteStatus::Completed, None).await
    }

    async fn mark_failed(&self, id: WriteQueueId, message: &str) -> Result<(), AppError> {
        self.transition(id, WriteStatus::Error, Some(message)).await
    }

    async fn purge_completed(&self) -> Result<u64, AppError> {
        let result = sqlx::query(DELETE_COMPLETED_WRITES)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn find(&self, id: WriteQueueId) -> Result<Option<QueuedWrite>, AppError> {
        let row = sqlx::query_as::<_, WriteQueueRow>(SELECT_WRITE_BY_ID)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| queued_write_from_row(id, row).map_err(AppError::Database))
            .transpose()
    }

    async fn snapshot(&self) -> Result<QueueSnapshot, AppError> {
        let counts = sqlx::query_as::<_, StatusCountRow>(COUNT_WRITES_BY_STATUS)
            .fetch_all(&self.pool)
            .await?;

        let mut snapshot = QueueSnapshot::default();
        for row in counts {
            let count = u32::try_from(row.count).unwrap_or(u32::MAX);
            match row.status.parse::<WriteStatus>() {
                Ok(WriteStatus::Pending) => snapshot.pending_count = count,
                Ok(WriteStatus::Error) => snapshot.error_count = count,
                _ => {}
            }
        }

        if snapshot.error_count > 0 {
            let failed = sqlx::query_as::<_, FailedWriteRow>(SELECT_FAILED_WRITES)
                .bind(FAILED_WRITES_IN_SNAPSHOT)
                .fetch_all(&self.pool)
                .await?;
            snapshot.failed_writes = failed
                .into_iter()
                .map(failed_digest_from_row)
                .collect::<Result<_, _>>()?;
        }

        Ok(snapshot)
    }
}
