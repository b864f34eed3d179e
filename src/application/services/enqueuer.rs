use crate::application::ports::write_queue_store::WriteQueueStore;
use crate::domain::entities::{LocalMutation, WriteDraft};
use crate::domain::value_objects::{
    RecordId, TargetTable, WriteOperation, WritePayload, WriteQueueId,
};
use crate::shared::error::AppError;
use serde_json::Value;
use std::sync::Arc;

/// Records intended remote mutations in the durable queue. Never touches the
/// network.
pub struct MutationEnqueuer {
    store: Arc<dyn WriteQueueStore>,
}

impl MutationEnqueuer {
    pub fn new(store: Arc<dyn WriteQueueStore>) -> Self {
        Self { store }
    }

    /// Persist one `pending` entry. A missing `record_id` for update/delete
    /// is accepted and surfaces when the entry is flushed.
    pub async fn enqueue(
        &self,
        target_table: &str,
        operation: WriteOperation,
        data: Value,
        record_id: Option<&str>,
    ) -> Result<WriteQueueId, AppError> {
        let draft = Self::build_draft(target_table, operation, data, record_id)?;
        self.enqueue_draft(draft).await
    }

    pub async fn enqueue_draft(&self, draft: WriteDraft) -> Result<WriteQueueId, AppError> {
        let id = self.store.enqueue(draft.clone()).await?;
        tracing::debug!(
            target: "sync::write_queue",
            id = id.value(),
            table = %draft.target_table,
            operation = %draft.operation,
            "queued write"
        );
        Ok(id)
    }

    /// Apply the optimistic local change and record the intent in one
    /// transaction.
    pub async fn enqueue_with_local(
        &self,
        mutation: LocalMutation,
        draft: WriteDraft,
    ) -> Result<WriteQueueId, AppError> {
        let id = self.store.enqueue_with_local(mutation, draft.clone()).await?;
        tracing::debug!(
            target: "sync::write_queue",
            id = id.value(),
            table = %draft.target_table,
            operation = %draft.operation,
            "applied local change and queued write"
        );
        Ok(id)
    }

    pub async fn enqueue_batch_with_local(
        &self,
        changes: Vec<(LocalMutation, WriteDraft)>,
    ) -> Result<Vec<WriteQueueId>, AppError> {
        let count = changes.len();
        let ids = self.store.enqueue_batch_with_local(changes).await?;
        tracing::debug!(
            target: "sync::write_queue",
            count,
            "applied local changes and queued writes"
        );
        Ok(ids)
    }

    fn build_draft(
        target_table: &str,
        operation: WriteOperation,
        data: Value,
        record_id: Option<&str>,
    ) -> Result<WriteDraft, AppError> {
        let target_table = TargetTable::new(target_table).map_err(AppError::ValidationError)?;
        let data = WritePayload::new(data).map_err(AppError::ValidationError)?;
        let record_id = record_id
            .map(RecordId::new)
            .transpose()
            .map_err(AppError::ValidationError)?;
        Ok(WriteDraft::new(target_table, operation, data, record_id))
    }
}
