use crate::application::ports::local_records::LocalRecordStore;
use crate::application::ports::session::SessionProvider;
use crate::application::services::enqueuer::MutationEnqueuer;
use crate::domain::entities::{LocalMutation, WriteDraft, LISTS_TABLE, TODOS_TABLE};
use crate::domain::value_objects::{RecordId, TargetTable, WritePayload, WriteQueueId};
use crate::shared::error::AppError;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Optimistic todo-list edits: each one changes the local tables right away
/// and queues the same intent for the remote side.
pub struct TodoMutations {
    enqueuer: Arc<MutationEnqueuer>,
    records: Arc<dyn LocalRecordStore>,
    session: Arc<dyn SessionProvider>,
}

impl TodoMutations {
    pub fn new(
        enqueuer: Arc<MutationEnqueuer>,
        records: Arc<dyn LocalRecordStore>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            enqueuer,
            records,
            session,
        }
    }

    pub async fn create_list(&self, name: &str) -> Result<RecordId, AppError> {
        let owner_id = self.require_user("create lists")?;
        let id = new_record_id()?;
        let row = payload(json!({
            "id": id.as_str(),
            "created_at": now_rfc3339(),
            "name": name,
            "owner_id": owner_id,
        }))?;

        self.insert(lists_table()?, row).await?;
        Ok(id)
    }

    pub async fn rename_list(&self, id: &RecordId, name: &str) -> Result<WriteQueueId, AppError> {
        self.patch(lists_table()?, id, payload(json!({ "name": name }))?)
            .await
    }

    /// Deletes the list's todos first, then the list, all in one transaction.
    pub async fn delete_list(&self, id: &RecordId) -> Result<Vec<WriteQueueId>, AppError> {
        let todos_table = todos_table()?;
        let lists_table = lists_table()?;

        let mut changes = Vec::new();
        for todo in self.records.todos_in_list(id).await? {
            let todo_id = RecordId::new(todo.id).map_err(AppError::ValidationError)?;
            changes.push(delete_change(&todos_table, todo_id));
        }
        changes.push(delete_change(&lists_table, id.clone()));

        self.enqueuer.enqueue_batch_with_local(changes).await
    }

    pub async fn create_todo(
        &self,
        list_id: &RecordId,
        description: &str,
    ) -> Result<RecordId, AppError> {
        let created_by = self.require_user("create todos")?;
        let id = new_record_id()?;
        let row = payload(json!({
            "id": id.as_str(),
            "created_at": now_rfc3339(),
            "created_by": created_by,
            "description": description,
            "list_id": list_id.as_str(),
            "completed": false,
        }))?;

        self.insert(todos_table()?, row).await?;
        Ok(id)
    }

    /// Completing records who and when; reopening clears both.
    pub async fn set_todo_completed(
        &self,
        id: &RecordId,
        completed: bool,
    ) -> Result<WriteQueueId, AppError> {
        let changes = if completed {
            let user_id = self.require_user("complete todos")?;
            json!({
                "completed": true,
                "completed_at": now_rfc3339(),
                "completed_by": user_id,
            })
        } else {
            json!({
                "completed": false,
                "completed_at": Value::Null,
                "completed_by": Value::Null,
            })
        };

        self.patch(todos_table()?, id, payload(changes)?).await
    }

    pub async fn edit_todo_description(
        &self,
        id: &RecordId,
        description: &str,
    ) -> Result<WriteQueueId, AppError> {
        self.patch(
            todos_table()?,
            id,
            payload(json!({ "description": description }))?,
        )
        .await
    }

    pub async fn delete_todo(&self, id: &RecordId) -> Result<WriteQueueId, AppError> {
        let (mutation, draft) = delete_change(&todos_table()?, id.clone());
        self.enqueuer.enqueue_with_local(mutation, draft).await
    }

    async fn insert(
        &self,
        table: TargetTable,
        row: WritePayload,
    ) -> Result<WriteQueueId, AppError> {
        let mutation = LocalMutation::Upsert {
            table: table.clone(),
            row: row.clone(),
        };
        self.enqueuer
            .enqueue_with_local(mutation, WriteDraft::insert(table, row))
            .await
    }

    async fn patch(
        &self,
        table: TargetTable,
        id: &RecordId,
        changes: WritePayload,
    ) -> Result<WriteQueueId, AppError> {
        let mutation = LocalMutation::Patch {
            table: table.clone(),
            id: id.clone(),
            changes: changes.clone(),
        };
        self.enqueuer
            .enqueue_with_local(mutation, WriteDraft::update(table, id.clone(), changes))
            .await
    }

    fn require_user(&self, action: &str) -> Result<String, AppError> {
        self.session
            .current_user_id()
            .ok_or_else(|| AppError::Unauthorized(format!("Could not {action}, no user id found")))
    }
}

fn delete_change(table: &TargetTable, id: RecordId) -> (LocalMutation, WriteDraft) {
    (
        LocalMutation::Delete {
            table: table.clone(),
            id: id.clone(),
        },
        WriteDraft::delete(table.clone(), id),
    )
}

fn lists_table() -> Result<TargetTable, AppError> {
    TargetTable::new(LISTS_TABLE).map_err(AppError::ValidationError)
}

fn todos_table() -> Result<TargetTable, AppError> {
    TargetTable::new(TODOS_TABLE).map_err(AppError::ValidationError)
}

fn payload(value: Value) -> Result<WritePayload, AppError> {
    WritePayload::new(value).map_err(AppError::ValidationError)
}

fn new_record_id() -> Result<RecordId, AppError> {
    RecordId::new(Uuid::new_v4().to_string()).map_err(AppError::ValidationError)
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
