use crate::application::ports::replication::{ReplicatedTableWriter, ReplicationFeed};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Applies the server-pushed read stream to the local tables.
///
/// Rows are written by primary-key overwrite and never consult the write
/// queue: a replicated row may overwrite a local optimistic edit that has
/// not been flushed yet.
pub struct ReadReplicator {
    writer: Arc<dyn ReplicatedTableWriter>,
}

impl ReadReplicator {
    pub fn new(writer: Arc<dyn ReplicatedTableWriter>) -> Self {
        Self { writer }
    }

    pub fn subscribe(&self, feed: &dyn ReplicationFeed) -> ReplicationHandle {
        let mut changes = feed.changes();
        let writer = Arc::clone(&self.writer);
        let (cancel_tx, mut cancel_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = cancel_rx.changed() => {
                        if changed.is_err() || *cancel_rx.borrow() {
                            break;
                        }
                    }
                    next = changes.next() => match next {
                        Some(Ok(change)) => {
                            if let Err(err) = writer.apply_change(&change).await {
                                tracing::warn!(
                                    target: "sync::replication",
                                    table = %change.table(),
                                    error = %err,
                                    "failed to apply replicated change"
                                );
                            }
                        }
                        Some(Err(err)) => {
                            tracing::warn!(
                                target: "sync::replication",
                                error = %err,
                                "replication feed error"
                            );
                        }
                        None => {
                            tracing::info!(target: "sync::replication", "replication feed ended");
                            break;
                        }
                    },
                }
            }
        });

        tracing::info!(target: "sync::replication", "replication subscribed");
        ReplicationHandle { cancel_tx, task }
    }
}

pub struct ReplicationHandle {
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReplicationHandle {
    pub fn unsubscribe(&self) {
        let _ = self.cancel_tx.send(true);
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}
