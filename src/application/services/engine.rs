use crate::application::ports::network::NetworkStatus;
use crate::application::ports::replication::ReplicationFeed;
use crate::application::ports::session::{SessionChange, SessionProvider};
use crate::application::ports::write_queue_store::WriteQueueStore;
use crate::application::services::enqueuer::MutationEnqueuer;
use crate::application::services::flusher::QueueFlusher;
use crate::application::services::lifecycle::{LifecycleEvent, ObserverDisposer, Observers};
use crate::application::services::replicator::{ReadReplicator, ReplicationHandle};
use crate::application::services::scheduler::{FlushHandle, FlushScheduler, SchedulerConfig};
use crate::domain::entities::{FlushSummary, QueueSnapshot, WriteDraft};
use crate::domain::value_objects::WriteQueueId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub connected: bool,
    pub online: bool,
    pub queue: QueueSnapshot,
}

/// Capabilities a UI needs from the sync layer.
#[async_trait]
pub trait SyncEngine: Send + Sync {
    async fn enqueue(&self, draft: WriteDraft) -> Result<WriteQueueId, AppError>;
    /// `None` when a scheduled pass is already running.
    async fn flush_now(&self) -> Result<Option<FlushSummary>, AppError>;
    fn subscribe_reads(&self) -> ReplicationHandle;
    async fn connect(&self) -> Result<(), AppError>;
    fn disconnect(&self);
    async fn status(&self) -> Result<EngineStatus, AppError>;
}

/// Which session, if any, has been announced since `init`.
#[derive(Default)]
struct SessionAnnouncer {
    state: Mutex<AnnouncedSession>,
}

#[derive(Default)]
struct AnnouncedSession {
    initialized: bool,
    user_id: Option<String>,
}

impl SessionAnnouncer {
    /// Returns false when already initialized.
    fn initialize(&self) -> bool {
        let mut state = lock(&self.state);
        !std::mem::replace(&mut state.initialized, true)
    }

    /// Records the signed-in user and returns the event for a new session.
    fn observe(&self, user_id: Option<String>) -> Option<LifecycleEvent> {
        let mut state = lock(&self.state);
        if !state.initialized || state.user_id == user_id {
            return None;
        }
        state.user_id = user_id.clone();
        user_id.map(|user_id| LifecycleEvent::SessionStarted { user_id })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Connection {
    scheduler: Arc<FlushHandle>,
    replication: ReplicationHandle,
}

/// Write queue + read replication, wired by dependency injection.
pub struct QueueSyncEngine {
    store: Arc<dyn WriteQueueStore>,
    enqueuer: Arc<MutationEnqueuer>,
    flusher: Arc<QueueFlusher>,
    replicator: ReadReplicator,
    feed: Arc<dyn ReplicationFeed>,
    network: Arc<dyn NetworkStatus>,
    session: Arc<dyn SessionProvider>,
    scheduler_config: SchedulerConfig,
    connection: Mutex<Option<Connection>>,
    sessions: Arc<SessionAnnouncer>,
    observers: Observers<LifecycleEvent>,
    _session_watch: ObserverDisposer,
}

pub struct QueueSyncEngineParts {
    pub store: Arc<dyn WriteQueueStore>,
    pub flusher: Arc<QueueFlusher>,
    pub replicator: ReadReplicator,
    pub feed: Arc<dyn ReplicationFeed>,
    pub network: Arc<dyn NetworkStatus>,
    pub session: Arc<dyn SessionProvider>,
    pub scheduler_config: SchedulerConfig,
}

impl QueueSyncEngine {
    pub fn new(parts: QueueSyncEngineParts) -> Self {
        let QueueSyncEngineParts {
            store,
            flusher,
            replicator,
            feed,
            network,
            session,
            scheduler_config,
        } = parts;

        let sessions = Arc::new(SessionAnnouncer::default());
        let observers: Observers<LifecycleEvent> = Observers::new();
        let session_watch = {
            let sessions = Arc::clone(&sessions);
            let observers = observers.clone();
            session.on_change(Box::new(move |change: &SessionChange| {
                let user_id = match change {
                    SessionChange::SignedIn { user_id } => Some(user_id.clone()),
                    SessionChange::SignedOut => None,
                };
                if let Some(event) = sessions.observe(user_id) {
                    observers.notify(&event);
                }
            }))
        };

        Self {
            enqueuer: Arc::new(MutationEnqueuer::new(Arc::clone(&store))),
            store,
            flusher,
            replicator,
            feed,
            network,
            session,
            scheduler_config,
            connection: Mutex::new(None),
            sessions,
            observers,
            _session_watch: session_watch,
        }
    }

    pub fn enqueuer(&self) -> Arc<MutationEnqueuer> {
        Arc::clone(&self.enqueuer)
    }

    pub fn observe<F>(&self, callback: F) -> ObserverDisposer
    where
        F: Fn(&LifecycleEvent) + Send + Sync + 'static,
    {
        self.observers.register(callback)
    }

    /// Announces `Initialized`, then `SessionStarted` when a user is signed
    /// in. Later calls do nothing. After this, every sign-in of a new user
    /// announces `SessionStarted` once.
    pub fn init(&self) {
        if !self.sessions.initialize() {
            return;
        }
        self.observers.notify(&LifecycleEvent::Initialized);
        if let Some(event) = self.sessions.observe(self.session.current_user_id()) {
            self.observers.notify(&event);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection_slot().is_some()
    }

    fn connection_slot(&self) -> std::sync::MutexGuard<'_, Option<Connection>> {
        lock(&self.connection)
    }
}

#[async_trait]
impl SyncEngine for QueueSyncEngine {
    async fn enqueue(&self, draft: WriteDraft) -> Result<WriteQueueId, AppError> {
        self.enqueuer.enqueue_draft(draft).await
    }

    async fn flush_now(&self) -> Result<Option<FlushSummary>, AppError> {
        let scheduler = self
            .connection_slot()
            .as_ref()
            .map(|connection| Arc::clone(&connection.scheduler));
        match scheduler {
            Some(scheduler) => {
                let summary = scheduler.flush_now().await?;
                if summary.is_none() {
                    tracing::debug!(
                        target: "sync::scheduler",
                        "flush already in progress, manual flush skipped"
                    );
                }
                Ok(summary)
            }
            None => self.flusher.flush().await.map(Some),
        }
    }

    fn subscribe_reads(&self) -> ReplicationHandle {
        self.replicator.subscribe(self.feed.as_ref())
    }

    async fn connect(&self) -> Result<(), AppError> {
        {
            let mut slot = self.connection_slot();
            if slot.is_some() {
                return Ok(());
            }
            let replication = self.subscribe_reads();
            let scheduler = FlushScheduler::start(
                self.flusher.clone(),
                Arc::clone(&self.network),
                self.scheduler_config.clone(),
            );
            *slot = Some(Connection {
                scheduler: Arc::new(scheduler),
                replication,
            });
        }

        tracing::info!(target: "sync::scheduler", "sync engine connected");
        self.observers.notify(&LifecycleEvent::Connected);
        Ok(())
    }

    fn disconnect(&self) {
        let connection = self.connection_slot().take();
        if let Some(connection) = connection {
            connection.replication.unsubscribe();
            connection.scheduler.cancel();
            tracing::info!(target: "sync::scheduler", "sync engine disconnected");
            self.observers.notify(&LifecycleEvent::Disconnected);
        }
    }

    async fn status(&self) -> Result<EngineStatus, AppError> {
        Ok(EngineStatus {
            connected: self.is_connected(),
            online: self.network.is_online(),
            queue: self.store.snapshot().await?,
        })
    }
}
