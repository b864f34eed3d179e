use crate::application::ports::local_records::LocalRecordStore;
use crate::domain::entities::{ListRecord, ListSummary, TodoRecord};
use crate::domain::value_objects::RecordId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

const SELECT_LIST_SUMMARIES: &str = r#"
    SELECT l.id,
           l.created_at,
           l.name,
           l.owner_id,
           COUNT(t.id) AS total_tasks,
           COALESCE(SUM(CASE WHEN t.completed = 1 THEN 1 ELSE 0 END), 0) AS completed_tasks
    FROM lists l
    LEFT JOIN todos t ON t.list_id = l.id
    GROUP BY l.id
    ORDER BY l.created_at, l.id
"#;

const SELECT_LIST_BY_ID: &str = r#"
    SELECT id, created_at, name, owner_id
    FROM lists
    WHERE id = ?1
"#;

const SELECT_TODOS_BY_LIST: &str = r#"
    SELECT id, list_id, created_at, completed_at, description, created_by, completed_by, completed
    FROM todos
    WHERE list_id = ?1
    ORDER BY created_at, id
"#;

const SELECT_TODO_BY_ID: &str = r#"
    SELECT id, list_id, created_at, completed_at, description, created_by, completed_by, completed
    FROM todos
    WHERE id = ?1
"#;

pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocalRecordStore for SqliteRecordStore {
    async fn list_summaries(&self) -> Result<Vec<ListSummary>, AppError> {
        Ok(sqlx::query_as::<_, ListSummary>(SELECT_LIST_SUMMARIES)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_list(&self, id: &RecordId) -> Result<Option<ListRecord>, AppError> {
        Ok(sqlx::query_as::<_, ListRecord>(SELECT_LIST_BY_ID)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn todos_in_list(&self, list_id: &RecordId) -> Result<Vec<TodoRecord>, AppError> {
        Ok(sqlx::query_as::<_, TodoRecord>(SELECT_TODOS_BY_LIST)
            .bind(list_id.as_str())
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_todo(&self, id: &RecordId) -> Result<Option<TodoRecord>, AppError> {
        Ok(sqlx::query_as::<_, TodoRecord>(SELECT_TODO_BY_ID)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?)
    }
}
