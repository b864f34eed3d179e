use crate::domain::entities::RowChange;
use crate::shared::error::AppError;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Server-pushed feed of authoritative row changes.
pub trait ReplicationFeed: Send + Sync {
    fn changes(&self) -> BoxStream<'static, Result<RowChange, AppError>>;
}

/// Local side of the read path: applies authoritative rows by primary-key
/// overwrite, with no knowledge of the write queue.
#[async_trait]
pub trait ReplicatedTableWriter: Send + Sync {
    async fn apply_change(&self, change: &RowChange) -> Result<(), AppError>;
}
