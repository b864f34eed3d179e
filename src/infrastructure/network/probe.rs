use crate::infrastructure::network::connectivity::ConnectivityMonitor;
use crate::shared::config::NetworkConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Polls a health URL and reports reachability to a [`ConnectivityMonitor`].
pub struct HttpConnectivityProbe {
    url: String,
    interval: Duration,
    http: reqwest::Client,
    monitor: Arc<ConnectivityMonitor>,
}

impl HttpConnectivityProbe {
    pub fn new(
        url: impl Into<String>,
        interval: Duration,
        monitor: Arc<ConnectivityMonitor>,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(interval.max(Duration::from_secs(1)))
            .build()
            .map_err(|e| {
                AppError::ConfigurationError(format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            url: url.into(),
            interval: interval.max(Duration::from_millis(10)),
            http,
            monitor,
        })
    }

    /// `None` when no probe URL is configured.
    pub fn from_config(
        config: &NetworkConfig,
        monitor: Arc<ConnectivityMonitor>,
    ) -> Result<Option<Self>, AppError> {
        config
            .probe_url
            .as_ref()
            .map(|url| {
                Self::new(
                    url.clone(),
                    Duration::from_secs(config.probe_interval_secs),
                    monitor,
                )
            })
            .transpose()
    }

    /// Any HTTP response counts as reachable; only transport failures mean
    /// offline.
    pub async fn check_once(&self) -> bool {
        let reachable = match self.http.get(&self.url).send().await {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(target: "sync::network", error = %err, "connectivity probe failed");
                false
            }
        };
        self.monitor.set_online(reachable);
        reachable
    }

    pub fn spawn(self) -> ProbeHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                tokio::select! {
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        self.check_once().await;
                    }
                }
            }
        });
        ProbeHandle { stop_tx, task }
    }
}

pub struct ProbeHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ProbeHandle {
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::network::NetworkStatus;
    use axum::routing::get;
    use axum::Router;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn reachable_url_sets_online() {
        let app = Router::new().route("/health", get(|| async { "ok" }));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let monitor = Arc::new(ConnectivityMonitor::new(false));
        let probe = HttpConnectivityProbe::new(
            format!("http://{addr}/health"),
            Duration::from_secs(1),
            monitor.clone(),
        )
        .unwrap();

        assert!(probe.check_once().await);
        assert!(monitor.is_online());
    }

    #[tokio::test]
    async fn unreachable_url_sets_offline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let monitor = Arc::new(ConnectivityMonitor::new(true));
        let probe = HttpConnectivityProbe::new(
            format!("http://{addr}/health"),
            Duration::from_secs(1),
            monitor.clone(),
        )
        .unwrap();

        let handle = probe.spawn();
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.stop();

        assert!(!monitor.is_online());
    }

    #[test]
    fn no_probe_without_url() {
        let config = NetworkConfig {
            probe_url: None,
            probe_interval_secs: 10,
        };
        let probe =
            HttpConnectivityProbe::from_config(&config, Arc::new(ConnectivityMonitor::default()))
                .unwrap();
        assert!(probe.is_none());
    }
}
