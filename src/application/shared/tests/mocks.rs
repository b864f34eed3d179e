use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::application::ports::local_records::LocalRecordStore;
use crate::application::ports::remote_records::{RemoteError, RemoteRecordApi};
use crate::application::ports::replication::ReplicatedTableWriter;
use crate::application::ports::write_queue_store::WriteQueueStore;
use crate::application::services::flusher::FlushWorker;
use crate::domain::entities::{
    FailedWriteDigest, FlushSummary, ListRecord, ListSummary, LocalMutation, QueueSnapshot,
    QueuedWrite, ReplayCandidate, RowChange, TodoRecord, UndecodableWrite, WriteDraft,
};
use crate::domain::value_objects::{
    RecordId, TargetTable, WritePayload, WriteQueueId, WriteStatus,
};
use crate::shared::error::AppError;

enum MemoryEntry {
    Decoded(QueuedWrite),
    Undecodable {
        reason: String,
        status: WriteStatus,
        error_message: Option<String>,
    },
}

impl MemoryEntry {
    fn status(&self) -> WriteStatus {
        match self {
            MemoryEntry::Decoded(write) => write.status,
            MemoryEntry::Undecodable { status, .. } => *status,
        }
    }
}

#[derive(Default)]
struct MemoryQueueState {
    next_id: i64,
    entries: BTreeMap<i64, MemoryEntry>,
    local_mutations: Vec<LocalMutation>,
}

/// In-memory queue with the same status rules as the SQLite store.
#[derive(Default)]
pub struct MemoryQueueStore {
    state: Arc<RwLock<MemoryQueueState>>,
    fail_next_completion: AtomicBool,
    purge_calls: AtomicUsize,
}

impl MemoryQueueStore {
    pub async fn entries(&self) -> Vec<QueuedWrite> {
        self.state
            .read()
            .await
            .entries
            .values()
            .filter_map(|entry| match entry {
                MemoryEntry::Decoded(write) => Some(write.clone()),
                MemoryEntry::Undecodable { .. } => None,
            })
            .collect()
    }

    pub async fn entry(&self, id: WriteQueueId) -> Option<QueuedWrite> {
        match self.state.read().await.entries.get(&id.value()) {
            Some(MemoryEntry::Decoded(write)) => Some(write.clone()),
            _ => None,
        }
    }

    pub async fn local_mutations(&self) -> Vec<LocalMutation> {
        self.state.read().await.local_mutations.clone()
    }

    /// Adds a row whose stored payload cannot be decoded.
    pub async fn push_undecodable(&self, reason: &str) -> WriteQueueId {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let id = state.next_id;
        state.entries.insert(
            id,
            MemoryEntry::Undecodable {
                reason: reason.to_string(),
                status: WriteStatus::Pending,
                error_message: None,
            },
        );
        WriteQueueId::new(id).unwrap()
    }

    pub async fn failure_of(&self, id: WriteQueueId) -> Option<String> {
        match self.state.read().await.entries.get(&id.value()) {
            Some(MemoryEntry::Decoded(write)) => write.error_message.clone(),
            Some(MemoryEntry::Undecodable { error_message, .. }) => error_message.clone(),
            None => None,
        }
    }

    /// The next `mark_completed` fails as if the status update were lost.
    pub fn fail_next_completion(&self) {
        self.fail_next_completion.store(true, Ordering::SeqCst);
    }

    pub fn purge_calls(&self) -> usize {
        self.purge_calls.load(Ordering::SeqCst)
    }

    fn insert(state: &mut MemoryQueueState, draft: WriteDraft) -> WriteQueueId {
        state.next_id += 1;
        let id = WriteQueueId::new(state.next_id).unwrap();
        state.entries.insert(
            id.value(),
            MemoryEntry::Decoded(QueuedWrite::new(
                id,
                draft.target_table,
                draft.operation,
                draft.data,
                draft.record_id,
                WriteStatus::Pending,
                Utc::now(),
                None,
            )),
        );
        id
    }

    async fn set_status(
        &self,
        id: WriteQueueId,
        next: WriteStatus,
        message: Option<String>,
    ) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        match state.entries.get_mut(&id.value()) {
            Some(MemoryEntry::Decoded(write)) if write.status.can_transition_to(next) => {
                write.status = next;
                write.error_message = message;
            }
            Some(MemoryEntry::Undecodable {
                status,
                error_message,
                ..
            }) if status.can_transition_to(next) => {
                *status = next;
                *error_message = message;
            }
            _ => {}
        }
        Ok(())
    }
}

#[async_trait]
impl WriteQueueStore for MemoryQueueStore {
    async fn enqueue(&self, draft: WriteDraft) -> Result<WriteQueueId, AppError> {
        let mut state = self.state.write().await;
        Ok(Self::insert(&mut state, draft))
    }

    async fn enqueue_batch_with_local(
        &self,
        changes: Vec<(LocalMutation, WriteDraft)>,
    ) -> Result<Vec<WriteQueueId>, AppError> {
        let mut state = self.state.write().await;
        let mut ids = Vec::with_capacity(changes.len());
        for (mutation, draft) in changes {
            state.local_mutations.push(mutation);
            ids.push(Self::insert(&mut state, draft));
        }
        Ok(ids)
    }

    async fn replayable_writes(&self) -> Result<Vec<ReplayCandidate>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .iter()
            .filter(|(_, entry)| entry.status().is_replayable())
            .map(|(id, entry)| match entry {
                MemoryEntry::Decoded(write) => Ok(write.clone()),
                MemoryEntry::Undecodable { reason, .. } => Err(UndecodableWrite {
                    id: WriteQueueId::new(*id).unwrap(),
                    reason: reason.clone(),
                }),
            })
            .collect())
    }

    async fn mark_completed(&self, id: WriteQueueId) -> Result<(), AppError> {
        if self.fail_next_completion.swap(false, Ordering::SeqCst) {
            return Err(AppError::Database("disk I/O error".to_string()));
        }
        self.set_status(id, WriteStatus::Completed, None).await
    }

    async fn mark_failed(&self, id: WriteQueueId, message: &str) -> Result<(), AppError> {
        self.set_status(id, WriteStatus::Error, Some(message.to_string()))
            .await
    }

    async fn purge_completed(&self) -> Result<u64, AppError> {
        self.purge_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;
        let before = state.entries.len();
        state
            .entries
            .retain(|_, entry| entry.status() != WriteStatus::Completed);
        Ok((before - state.entries.len()) as u64)
    }

    async fn find(&self, id: WriteQueueId) -> Result<Option<QueuedWrite>, AppError> {
        Ok(self.entry(id).await)
    }

    async fn snapshot(&self) -> Result<QueueSnapshot, AppError> {
        let state = self.state.read().await;
        let mut snapshot = QueueSnapshot::default();
        for entry in state.entries.values() {
            match entry.status() {
                WriteStatus::Pending => snapshot.pending_count += 1,
                WriteStatus::Error => {
                    snapshot.error_count += 1;
                    if let MemoryEntry::Decoded(write) = entry {
                        snapshot.failed_writes.push(FailedWriteDigest {
                            id: write.id,
                            target_table: write.target_table.clone(),
                            operation: write.operation,
                            error_message: write.error_message.clone(),
                        });
                    }
                }
                WriteStatus::Completed => {}
            }
        }
        Ok(snapshot)
    }
}

/// Store whose every operation fails like an unavailable database.
pub struct FailingStore;

impl FailingStore {
    fn unavailable<T>() -> Result<T, AppError> {
        Err(AppError::Database("database is locked".to_string()))
    }
}

#[async_trait]
impl WriteQueueStore for FailingStore {
    async fn enqueue(&self, _draft: WriteDraft) -> Result<WriteQueueId, AppError> {
        Self::unavailable()
    }

    async fn enqueue_batch_with_local(
        &self,
        _changes: Vec<(LocalMutation, WriteDraft)>,
    ) -> Result<Vec<WriteQueueId>, AppError> {
        Self::unavailable()
    }

    async fn replayable_writes(&self) -> Result<Vec<ReplayCandidate>, AppError> {
        Self::unavailable()
    }

    async fn mark_completed(&self, _id: WriteQueueId) -> Result<(), AppError> {
        Self::unavailable()
    }

    async fn mark_failed(&self, _id: WriteQueueId, _message: &str) -> Result<(), AppError> {
        Self::unavailable()
    }

    async fn purge_completed(&self) -> Result<u64, AppError> {
        Self::unavailable()
    }

    async fn find(&self, _id: WriteQueueId) -> Result<Option<QueuedWrite>, AppError> {
        Self::unavailable()
    }

    async fn snapshot(&self) -> Result<QueueSnapshot, AppError> {
        Self::unavailable()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Upsert { table: String, id: Option<String> },
    Update { table: String, id: String },
    Delete { table: String, id: String },
}

type RemoteRows = HashMap<String, BTreeMap<String, Map<String, Value>>>;

/// Remote API double: records every call and keeps per-table row state with
/// upsert/update/delete semantics keyed by `id`.
#[derive(Default)]
pub struct RecordingRemote {
    calls: Arc<RwLock<Vec<RemoteCall>>>,
    rows: Arc<RwLock<RemoteRows>>,
    failures: Arc<RwLock<HashMap<String, RemoteError>>>,
    offline: AtomicBool,
    latency_ms: AtomicUsize,
}

impl RecordingRemote {
    pub async fn calls(&self) -> Vec<RemoteCall> {
        self.calls.read().await.clone()
    }

    pub async fn row(&self, table: &str, id: &str) -> Option<Map<String, Value>> {
        self.rows
            .read()
            .await
            .get(table)
            .and_then(|rows| rows.get(id))
            .cloned()
    }

    pub async fn table_len(&self, table: &str) -> usize {
        self.rows
            .read()
            .await
            .get(table)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Every operation touching `record_id` fails with `err`.
    pub async fn fail_record(&self, record_id: &str, err: RemoteError) {
        self.failures
            .write()
            .await
            .insert(record_id.to_string(), err);
    }

    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    /// While offline every call fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Every call sleeps this long before answering.
    pub fn set_latency(&self, latency: Duration) {
        let millis = usize::try_from(latency.as_millis()).unwrap_or(usize::MAX);
        self.latency_ms.store(millis, Ordering::SeqCst);
    }

    async fn check(&self, record_id: Option<&str>) -> Result<(), RemoteError> {
        let latency = self.latency_ms.load(Ordering::SeqCst) as u64;
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Network("network down".to_string()));
        }
        if let Some(id) = record_id {
            if let Some(err) = self.failures.read().await.get(id) {
                return Err(err.clone());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteRecordApi for RecordingRemote {
    async fn upsert(&self, table: &TargetTable, record: &WritePayload) -> Result<(), RemoteError> {
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string);
        self.calls.write().await.push(RemoteCall::Upsert {
            table: table.to_string(),
            id: id.clone(),
        });
        self.check(id.as_deref()).await?;

        let id = id.ok_or_else(|| RemoteError::Rejected {
            status: 400,
            message: "null value in column \"id\"".to_string(),
        })?;
        self.rows
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .insert(id, record.as_map().clone());
        Ok(())
    }

    async fn update_by_id(
        &self,
        table: &TargetTable,
        id: &RecordId,
        patch: &WritePayload,
    ) -> Result<(), RemoteError> {
        self.calls.write().await.push(RemoteCall::Update {
            table: table.to_string(),
            id: id.to_string(),
        });
        self.check(Some(id.as_str())).await?;

        if let Some(row) = self
            .rows
            .write()
            .await
            .get_mut(table.as_str())
            .and_then(|rows| rows.get_mut(id.as_str()))
        {
            for (column, value) in patch.columns() {
                row.insert(column.clone(), value.clone());
            }
        }
        Ok(())
    }

    async fn delete_by_id(&self, table: &TargetTable, id: &RecordId) -> Result<(), RemoteError> {
        self.calls.write().await.push(RemoteCall::Delete {
            table: table.to_string(),
            id: id.to_string(),
        });
        self.check(Some(id.as_str())).await?;

        if let Some(rows) = self.rows.write().await.get_mut(table.as_str()) {
            rows.remove(id.as_str());
        }
        Ok(())
    }
}

/// Flush worker that counts passes and tracks how many ran at once.
#[derive(Default)]
pub struct CountingWorker {
    passes: AtomicUsize,
    running: AtomicUsize,
    max_concurrency: AtomicUsize,
    delay: Option<Duration>,
    fail: bool,
}

impl CountingWorker {
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn passes(&self) -> usize {
        self.passes.load(Ordering::SeqCst)
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FlushWorker for CountingWorker {
    async fn flush(&self) -> Result<FlushSummary, AppError> {
        self.passes.fetch_add(1, Ordering::SeqCst);
        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrency.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.running.fetch_sub(1, Ordering::SeqCst);

        if self.fail {
            Err(AppError::Database("database is locked".to_string()))
        } else {
            Ok(FlushSummary::empty())
        }
    }
}

#[derive(Default)]
pub struct RecordingWriter {
    applied: Arc<RwLock<Vec<RowChange>>>,
}

impl RecordingWriter {
    pub async fn applied(&self) -> Vec<RowChange> {
        self.applied.read().await.clone()
    }
}

#[async_trait]
impl ReplicatedTableWriter for RecordingWriter {
    async fn apply_change(&self, change: &RowChange) -> Result<(), AppError> {
        self.applied.write().await.push(change.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRecordStore {
    lists: Arc<RwLock<Vec<ListRecord>>>,
    todos: Arc<RwLock<Vec<TodoRecord>>>,
}

impl MemoryRecordStore {
    pub async fn put_list(&self, list: ListRecord) {
        self.lists.write().await.push(list);
    }

    pub async fn put_todo(&self, todo: TodoRecord) {
        self.todos.write().await.push(todo);
    }
}

#[async_trait]
impl LocalRecordStore for MemoryRecordStore {
    async fn list_summaries(&self) -> Result<Vec<ListSummary>, AppError> {
        let todos = self.todos.read().await;
        Ok(self
            .lists
            .read()
            .await
            .iter()
            .map(|list| {
                let tasks: Vec<&TodoRecord> = todos
                    .iter()
                    .filter(|todo| todo.list_id.as_deref() == Some(list.id.as_str()))
                    .collect();
                ListSummary {
                    id: list.id.clone(),
                    created_at: list.created_at.clone(),
                    name: list.name.clone(),
                    owner_id: list.owner_id.clone(),
                    total_tasks: tasks.len() as i64,
                    completed_tasks: tasks.iter().filter(|todo| todo.completed).count() as i64,
                }
            })
            .collect())
    }

    async fn find_list(&self, id: &RecordId) -> Result<Option<ListRecord>, AppError> {
        Ok(self
            .lists
            .read()
            .await
            .iter()
            .find(|list| list.id == id.as_str())
            .cloned())
    }

    async fn todos_in_list(&self, list_id: &RecordId) -> Result<Vec<TodoRecord>, AppError> {
        Ok(self
            .todos
            .read()
            .await
            .iter()
            .filter(|todo| todo.list_id.as_deref() == Some(list_id.as_str()))
            .cloned()
            .collect())
    }

    async fn find_todo(&self, id: &RecordId) -> Result<Option<TodoRecord>, AppError> {
        Ok(self
            .todos
            .read()
            .await
            .iter()
            .find(|todo| todo.id == id.as_str())
            .cloned())
    }
}
