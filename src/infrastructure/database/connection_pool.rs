use crate::infrastructure::database::migrations::{self, FixupOutcome};
use crate::shared::config::DatabaseConfig;
use crate::shared::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tokio::sync::OnceCell;

/// Lazily opened local store. The first caller of [`DatabaseHandle::pool`]
/// connects, migrates and runs the data fix-ups; concurrent first callers
/// wait on that same initialization.
pub struct DatabaseHandle {
    config: DatabaseConfig,
    pool: OnceCell<SqlitePool>,
}

impl DatabaseHandle {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            pool: OnceCell::new(),
        }
    }

    /// Single-connection in-memory store, kept open for the handle's lifetime.
    pub fn in_memory() -> Self {
        Self::new(DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.pool.initialized()
    }

    pub async fn pool(&self) -> Result<SqlitePool, AppError> {
        self.pool
            .get_or_try_init(|| self.open())
            .await
            .map(SqlitePool::clone)
    }

    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
        }
    }

    async fn open(&self) -> Result<SqlitePool, AppError> {
        let options = SqliteConnectOptions::from_str(&self.config.url)
            .map_err(|e| AppError::ConfigurationError(format!("Invalid database url: {e}")))?
            .create_if_missing(true);

        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() && !is_memory_url(&self.config.url) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Database(format!(
                        "Failed to create database directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let mut pool_options =
            SqlitePoolOptions::new().max_connections(self.config.max_connections.max(1));
        if is_memory_url(&self.config.url) {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;

        migrations::run(&pool).await?;
        if let FixupOutcome::Applied { rows } = migrations::normalize_completed_flag(&pool).await? {
            tracing::info!(
                target: "db::migrations",
                rows,
                "normalized legacy todos.completed values"
            );
        }

        tracing::info!(target: "db::migrations", url = %self.config.url, "local store ready");
        Ok(pool)
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
