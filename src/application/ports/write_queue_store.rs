use crate::domain::entities::{
    LocalMutation, QueueSnapshot, QueuedWrite, ReplayCandidate, WriteDraft,
};
use crate::domain::value_objects::WriteQueueId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable write queue kept in the local store.
#[async_trait]
pub trait WriteQueueStore: Send + Sync {
    /// Persist a new `pending` entry and return its id.
    async fn enqueue(&self, draft: WriteDraft) -> Result<WriteQueueId, AppError>;

    /// Apply optimistic local changes and enqueue their intents in one
    /// transaction, in the given order. Ids are returned in the same order.
    async fn enqueue_batch_with_local(
        &self,
        changes: Vec<(LocalMutation, WriteDraft)>,
    ) -> Result<Vec<WriteQueueId>, AppError>;

    async fn enqueue_with_local(
        &self,
        mutation: LocalMutation,
        draft: WriteDraft,
    ) -> Result<WriteQueueId, AppError> {
        self.enqueue_batch_with_local(vec![(mutation, draft)])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("queue insert returned no id".to_string()))
    }

    /// Entries in `pending` or `error`, ascending by id.
    async fn replayable_writes(&self) -> Result<Vec<ReplayCandidate>, AppError>;

    async fn mark_completed(&self, id: WriteQueueId) -> Result<(), AppError>;

    async fn mark_failed(&self, id: WriteQueueId, message: &str) -> Result<(), AppError>;

    /// Delete every `completed` entry, returning how many were removed.
    async fn purge_completed(&self) -> Result<u64, AppError>;

    async fn find(&self, id: WriteQueueId) -> Result<Option<QueuedWrite>, AppError>;

    async fn snapshot(&self) -> Result<QueueSnapshot, AppError>;
}
