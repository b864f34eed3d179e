use crate::application::ports::replication::ReplicatedTableWriter;
use crate::domain::entities::RowChange;
use crate::infrastructure::database::table_writer;
use crate::shared::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Writes replicated rows straight into the local tables.
pub struct SqliteReplicatedWriter {
    pool: SqlitePool,
}

impl SqliteReplicatedWriter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReplicatedTableWriter for SqliteReplicatedWriter {
    async fn apply_change(&self, change: &RowChange) -> Result<(), AppError> {
        let mut conn = self.pool.acquire().await?;
        table_writer::apply_row_change(&mut conn, change).await?;
        tracing::trace!(
            target: "sync::replication",
            table = %change.table(),
            "applied replicated change"
        );
        Ok(())
    }
}
