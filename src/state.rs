use crate::application::ports::network::NetworkStatus;
use crate::application::services::engine::{QueueSyncEngine, QueueSyncEngineParts, SyncEngine};
use crate::application::services::enqueuer::MutationEnqueuer;
use crate::application::services::flusher::QueueFlusher;
use crate::application::services::mutations::TodoMutations;
use crate::application::services::replicator::ReadReplicator;
use crate::application::services::scheduler::SchedulerConfig;
use crate::infrastructure::database::{DatabaseHandle, SqliteRecordStore};
use crate::infrastructure::network::{ConnectivityMonitor, HttpConnectivityProbe, ProbeHandle};
use crate::infrastructure::queue::SqliteWriteQueueStore;
use crate::infrastructure::remote::PostgrestRecordApi;
use crate::infrastructure::replication::{ChannelFeed, SqliteReplicatedWriter};
use crate::infrastructure::session::StaticSession;
use crate::shared::config::AppConfig;
use anyhow::Context;
use std::sync::Arc;

const REPLICATION_FEED_CAPACITY: usize = 256;

/// Everything a client needs, wired once at startup.
pub struct AppState {
    pub config: AppConfig,
    pub database: Arc<DatabaseHandle>,
    pub network: Arc<ConnectivityMonitor>,
    pub session: Arc<StaticSession>,
    /// Transport adapters publish server row changes here.
    pub replication_feed: Arc<ChannelFeed>,
    pub records: Arc<SqliteRecordStore>,
    pub engine: Arc<QueueSyncEngine>,
    pub mutations: Arc<TodoMutations>,
    probe: Option<ProbeHandle>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        Self::with_session(config, Arc::new(StaticSession::default())).await
    }

    pub async fn with_session(
        config: AppConfig,
        session: Arc<StaticSession>,
    ) -> anyhow::Result<Self> {
        config
            .validate()
            .map_err(anyhow::Error::msg)
            .context("invalid configuration")?;

        let database = Arc::new(DatabaseHandle::new(config.database.clone()));
        let pool = database
            .pool()
            .await
            .context("failed to open local store")?;

        let network = Arc::new(ConnectivityMonitor::new(true));
        let probe = HttpConnectivityProbe::from_config(&config.network, Arc::clone(&network))?
            .map(HttpConnectivityProbe::spawn);

        let store = Arc::new(SqliteWriteQueueStore::new(pool.clone()));
        let remote = Arc::new(
            PostgrestRecordApi::new(&config.remote, session.clone())
                .context("failed to build remote record client")?,
        );
        let records = Arc::new(SqliteRecordStore::new(pool.clone()));
        let replication_feed = Arc::new(ChannelFeed::new(REPLICATION_FEED_CAPACITY));

        let engine = Arc::new(QueueSyncEngine::new(QueueSyncEngineParts {
            store: store.clone(),
            flusher: Arc::new(QueueFlusher::new(store.clone(), remote)),
            replicator: ReadReplicator::new(Arc::new(SqliteReplicatedWriter::new(pool))),
            feed: replication_feed.clone(),
            network: network.clone(),
            session: session.clone(),
            scheduler_config: SchedulerConfig::from(&config.sync),
        }));
        let mutations = Arc::new(TodoMutations::new(
            engine.enqueuer(),
            records.clone(),
            session.clone(),
        ));

        engine.init();
        if config.sync.auto_connect {
            engine.connect().await.context("failed to start sync")?;
        }

        tracing::info!(
            target: "sync::scheduler",
            online = network.is_online(),
            auto_connect = config.sync.auto_connect,
            "sync state initialized"
        );

        Ok(Self {
            config,
            database,
            network,
            session,
            replication_feed,
            records,
            engine,
            mutations,
            probe,
        })
    }

    pub fn enqueuer(&self) -> Arc<MutationEnqueuer> {
        self.engine.enqueuer()
    }

    /// Stops background work. In-flight flushes are left to finish.
    pub fn shutdown(&self) {
        self.engine.disconnect();
        if let Some(probe) = &self.probe {
            probe.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::local_records::LocalRecordStore;

    fn offline_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.database.url = "sqlite::memory:".to_string();
        config.database.max_connections = 1;
        config.remote.base_url = "http://127.0.0.1:9".to_string();
        config.sync.auto_connect = false;
        config
    }

    #[tokio::test]
    async fn wires_mutations_to_the_queue() {
        let session = Arc::new(StaticSession::signed_in("u1", "token"));
        let state = AppState::with_session(offline_config(), session)
            .await
            .unwrap();

        let list_id = state.mutations.create_list("Groceries").await.unwrap();

        assert!(state.records.find_list(&list_id).await.unwrap().is_some());
        let status = state.engine.status().await.unwrap();
        assert!(!status.connected);
        assert_eq!(status.queue.pending_count, 1);

        state.shutdown();
    }

    #[tokio::test]
    async fn rejects_invalid_configuration() {
        let mut config = offline_config();
        config.remote.base_url = String::new();

        assert!(AppState::new(config).await.is_err());
    }
}
