//! Offline-first write path for a todo-list client: a durable local queue of
//! intended mutations replayed against a remote record API, alongside a
//! read-path replicator that mirrors server rows into the local store.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::ports::{
    ConnectivityEvent, LocalRecordStore, NetworkStatus, RemoteError, RemoteRecordApi,
    ReplicatedTableWriter, ReplicationFeed, RetryClass, SessionChange, SessionProvider,
    WriteQueueStore,
};
pub use application::services::{
    EngineStatus, FlushHandle, FlushScheduler, FlushWorker, LifecycleEvent, MutationEnqueuer,
    ObserverDisposer, Observers, QueueFlusher, QueueSyncEngine, QueueSyncEngineParts,
    ReadReplicator, ReplicationHandle, SchedulerConfig, SyncEngine, TodoMutations,
};
pub use domain::entities::{
    FailedWriteDigest, FlushSummary, ListRecord, ListSummary, LocalMutation, QueueSnapshot,
    QueuedWrite, RowChange, TodoRecord, WriteDraft,
};
pub use domain::value_objects::{
    RecordId, TargetTable, WriteOperation, WritePayload, WriteQueueId, WriteStatus,
};
pub use shared::{AppConfig, AppError, Result};
pub use state::AppState;

/// Installs the fmt subscriber with `RUST_LOG` filtering. A subscriber the
/// host already installed is left in place.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todolist_sync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
