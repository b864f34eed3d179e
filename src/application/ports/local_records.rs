use crate::domain::entities::{ListRecord, ListSummary, TodoRecord};
use crate::domain::value_objects::RecordId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Read access to the replicated application tables.
#[async_trait]
pub trait LocalRecordStore: Send + Sync {
    async fn list_summaries(&self) -> Result<Vec<ListSummary>, AppError>;

    async fn find_list(&self, id: &RecordId) -> Result<Option<ListRecord>, AppError>;

    async fn todos_in_list(&self, list_id: &RecordId) -> Result<Vec<TodoRecord>, AppError>;

    async fn find_todo(&self, id: &RecordId) -> Result<Option<TodoRecord>, AppError>;
}
