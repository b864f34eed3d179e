use crate::application::ports::replication::ReplicationFeed;
use crate::domain::entities::RowChange;
use crate::shared::error::AppError;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// In-process replication feed. Whatever transport receives the server's
/// change stream publishes into it; each `changes()` call is an independent
/// subscription starting at the next published change.
pub struct ChannelFeed {
    sender: broadcast::Sender<Result<RowChange, AppError>>,
}

impl ChannelFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns the number of subscriptions that received the change.
    pub fn publish(&self, change: Result<RowChange, AppError>) -> Result<usize, AppError> {
        self.sender
            .send(change)
            .map_err(|_| AppError::Internal("replication feed has no subscribers".to_string()))
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl ReplicationFeed for ChannelFeed {
    fn changes(&self) -> BoxStream<'static, Result<RowChange, AppError>> {
        let receiver = self.sender.subscribe();
        stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(change) => return Some((change, receiver)),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            target: "sync::replication",
                            skipped,
                            "replication subscriber lagged"
                        );
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}
