use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WriteQueueRow {
    pub id: i64,
    pub target_table: String,
    pub operation: String,
    pub data: String,
    pub record_id: Option<String>,
    pub status: String,
    pub created_at: String,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StatusCountRow {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FailedWriteRow {
    pub id: i64,
    pub target_table: String,
    pub operation: String,
    pub error_message: Option<String>,
}
