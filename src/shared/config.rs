use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub remote: RemoteConfig,
    pub sync: SyncConfig,
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub anon_key: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub flush_interval_ms: u64,
    /// Skip scheduler triggers while a flush pass is still running.
    pub serialize_passes: bool,
    pub auto_connect: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub probe_url: Option<String>,
    pub probe_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/todolist.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            remote: RemoteConfig {
                base_url: String::new(),
                anon_key: String::new(),
                request_timeout_secs: 15,
            },
            sync: SyncConfig::default(),
            network: NetworkConfig {
                probe_url: None,
                probe_interval_secs: 10,
            },
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            flush_interval_ms: 5_000, // 5 seconds
            serialize_passes: true,
            auto_connect: true,
        }
    }
}

impl SyncConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}

impl RemoteConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("TODOLIST_SYNC_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v.trim().to_string();
            }
        }
        if let Some(value) = env_u64("TODOLIST_SYNC_DATABASE_MAX_CONNECTIONS") {
            cfg.database.max_connections = u32::try_from(value).unwrap_or(u32::MAX);
        }

        if let Ok(v) = std::env::var("TODOLIST_SYNC_REMOTE_URL") {
            cfg.remote.base_url = v.trim().trim_end_matches('/').to_string();
        }
        if let Ok(v) = std::env::var("TODOLIST_SYNC_REMOTE_ANON_KEY") {
            cfg.remote.anon_key = v.trim().to_string();
        }
        if let Some(value) = env_u64("TODOLIST_SYNC_REMOTE_TIMEOUT_SECS") {
            cfg.remote.request_timeout_secs = value.max(1);
        }

        if let Some(value) = env_u64("TODOLIST_SYNC_FLUSH_INTERVAL_MS") {
            cfg.sync.flush_interval_ms = value;
        }
        if let Ok(v) = std::env::var("TODOLIST_SYNC_SERIALIZE_PASSES") {
            cfg.sync.serialize_passes = parse_bool(&v, cfg.sync.serialize_passes);
        }
        if let Ok(v) = std::env::var("TODOLIST_SYNC_AUTO_CONNECT") {
            cfg.sync.auto_connect = parse_bool(&v, cfg.sync.auto_connect);
        }

        if let Ok(v) = std::env::var("TODOLIST_SYNC_PROBE_URL") {
            let trimmed = v.trim();
            cfg.network.probe_url = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            };
        }
        if let Some(value) = env_u64("TODOLIST_SYNC_PROBE_INTERVAL_SECS") {
            cfg.network.probe_interval_secs = value.max(1);
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.sync.flush_interval_ms == 0 {
            return Err("Sync flush_interval_ms must be greater than 0".to_string());
        }
        if self.remote.base_url.trim().is_empty() {
            return Err("Remote base_url must be set".to_string());
        }
        if self.remote.request_timeout_secs == 0 {
            return Err("Remote request_timeout_secs must be greater than 0".to_string());
        }
        if self.network.probe_url.is_some() && self.network.probe_interval_secs == 0 {
            return Err("Network probe_interval_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| parse_u64(&v))
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
