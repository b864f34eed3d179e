use crate::application::ports::remote_records::{RemoteError, RemoteRecordApi};
use crate::application::ports::write_queue_store::WriteQueueStore;
use crate::domain::entities::{FlushSummary, QueuedWrite};
use crate::domain::value_objects::WriteOperation;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;

/// A single flush pass, as driven by the scheduler.
#[async_trait]
pub trait FlushWorker: Send + Sync {
    async fn flush(&self) -> Result<FlushSummary, AppError>;
}

/// Why a single entry ended up in `error`.
#[derive(Debug)]
enum EntryFailure {
    Invalid(String),
    Remote(RemoteError),
}

impl std::fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryFailure::Invalid(message) => f.write_str(message),
            EntryFailure::Remote(err) => write!(f, "{err}"),
        }
    }
}

/// Replays the durable queue against the remote record API.
pub struct QueueFlusher {
    store: Arc<dyn WriteQueueStore>,
    remote: Arc<dyn RemoteRecordApi>,
}

impl QueueFlusher {
    pub fn new(store: Arc<dyn WriteQueueStore>, remote: Arc<dyn RemoteRecordApi>) -> Self {
        Self { store, remote }
    }

    /// One pass over every `pending` and `error` entry in ascending id order.
    ///
    /// Entries are replayed sequentially. A remote or validation failure is
    /// recorded on the entry and the pass moves on; a local store failure
    /// aborts the pass and is returned.
    pub async fn flush(&self) -> Result<FlushSummary, AppError> {
        let candidates = self.store.replayable_writes().await?;
        if candidates.is_empty() {
            return Ok(FlushSummary::empty());
        }

        tracing::debug!(
            target: "sync::write_queue",
            entries = candidates.len(),
            "flushing write queue"
        );

        let mut summary = FlushSummary::empty();
        for candidate in candidates {
            let write = match candidate {
                Ok(write) => write,
                Err(undecodable) => {
                    tracing::warn!(
                        target: "sync::write_queue",
                        id = undecodable.id.value(),
                        reason = %undecodable.reason,
                        "queued write could not be decoded"
                    );
                    self.store
                        .mark_failed(undecodable.id, &undecodable.reason)
                        .await?;
                    summary.failed += 1;
                    continue;
                }
            };

            match self.replay(&write).await {
                Ok(()) => {
                    self.store.mark_completed(write.id).await?;
                    summary.processed += 1;
                }
                Err(failure) => {
                    let message = failure.to_string();
                    match &failure {
                        EntryFailure::Remote(err) => tracing::warn!(
                            target: "sync::write_queue",
                            id = write.id.value(),
                            table = %write.target_table,
                            operation = %write.operation,
                            retry = ?err.retry_class(),
                            error = %message,
                            "remote rejected queued write"
                        ),
                        EntryFailure::Invalid(_) => tracing::error!(
                            target: "sync::write_queue",
                            id = write.id.value(),
                            table = %write.target_table,
                            operation = %write.operation,
                            error = %message,
                            "queued write is malformed"
                        ),
                    }
                    self.store.mark_failed(write.id, &message).await?;
                    summary.failed += 1;
                }
            }
        }

        let purged = self.store.purge_completed().await?;
        tracing::info!(
            target: "sync::write_queue",
            processed = summary.processed,
            failed = summary.failed,
            purged,
            "write queue flush finished"
        );

        Ok(summary)
    }

    async fn replay(&self, write: &QueuedWrite) -> Result<(), EntryFailure> {
        match write.operation {
            WriteOperation::Insert => self
                .remote
                .upsert(&write.target_table, &write.data)
                .await
                .map_err(EntryFailure::Remote),
            WriteOperation::Update => {
                let id = write.required_record_id().map_err(EntryFailure::Invalid)?;
                self.remote
                    .update_by_id(&write.target_table, id, &write.data)
                    .await
                    .map_err(EntryFailure::Remote)
            }
            WriteOperation::Delete => {
                let id = write.required_record_id().map_err(EntryFailure::Invalid)?;
                self.remote
                    .delete_by_id(&write.target_table, id)
                    .await
                    .map_err(EntryFailure::Remote)
            }
        }
    }
}

#[async_trait]
impl FlushWorker for QueueFlusher {
    async fn flush(&self) -> Result<FlushSummary, AppError> {
        QueueFlusher::flush(self).await
    }
}
