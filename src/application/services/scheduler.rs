use crate::application::ports::network::{ConnectivityEvent, NetworkStatus};
use crate::application::services::flusher::FlushWorker;
use crate::domain::entities::FlushSummary;
use crate::shared::config::SyncConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{watch, Mutex};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub flush_interval: Duration,
    /// When set, a trigger that fires while a pass is running is skipped.
    pub serialize_passes: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for SchedulerConfig {
    fn from(config: &SyncConfig) -> Self {
        Self {
            flush_interval: config.flush_interval(),
            serialize_passes: config.serialize_passes,
        }
    }
}

struct SchedulerShared {
    worker: Arc<dyn FlushWorker>,
    network: Arc<dyn NetworkStatus>,
    gate: Mutex<()>,
    serialize_passes: bool,
}

impl SchedulerShared {
    fn trigger(self: &Arc<Self>, reason: &'static str) {
        if !self.network.is_online() {
            tracing::debug!(target: "sync::scheduler", reason, "offline, flush skipped");
            return;
        }
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = shared.run_pass(reason).await {
                tracing::error!(
                    target: "sync::scheduler",
                    reason,
                    error = %err,
                    "write queue flush failed"
                );
            }
        });
    }

    /// Runs one pass through the gate. `Ok(None)` means another pass held it.
    async fn run_pass(&self, reason: &'static str) -> Result<Option<FlushSummary>, AppError> {
        let _guard = if self.serialize_passes {
            match self.gate.try_lock() {
                Ok(guard) => Some(guard),
                Err(_) => {
                    tracing::debug!(
                        target: "sync::scheduler",
                        reason,
                        "flush already in progress, trigger skipped"
                    );
                    return Ok(None);
                }
            }
        } else {
            None
        };

        let summary = self.worker.flush().await?;
        if summary.attempted() > 0 {
            tracing::debug!(
                target: "sync::scheduler",
                reason,
                processed = summary.processed,
                failed = summary.failed,
                "flush pass completed"
            );
        }
        Ok(Some(summary))
    }
}

/// Drives flush passes: once on start, on every interval tick, and whenever
/// connectivity comes back.
pub struct FlushScheduler;

impl FlushScheduler {
    pub fn start(
        worker: Arc<dyn FlushWorker>,
        network: Arc<dyn NetworkStatus>,
        config: SchedulerConfig,
    ) -> FlushHandle {
        let shared = Arc::new(SchedulerShared {
            worker,
            network,
            gate: Mutex::new(()),
            serialize_passes: config.serialize_passes,
        });
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let events = shared.network.subscribe();

        shared.trigger("startup");
        tokio::spawn(run_loop(
            Arc::clone(&shared),
            config.flush_interval,
            cancel_rx,
            events,
        ));

        tracing::info!(
            target: "sync::scheduler",
            interval_ms = config.flush_interval.as_millis() as u64,
            serialize_passes = config.serialize_passes,
            "flush scheduler started"
        );

        FlushHandle { cancel_tx, shared }
    }
}

async fn run_loop(
    shared: Arc<SchedulerShared>,
    period: Duration,
    mut cancel_rx: watch::Receiver<bool>,
    mut events: tokio::sync::broadcast::Receiver<ConnectivityEvent>,
) {
    // interval_at panics on a zero period
    let period = period.max(Duration::from_millis(1));
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut events_open = true;

    loop {
        tokio::select! {
            changed = cancel_rx.changed() => {
                if changed.is_err() || *cancel_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => shared.trigger("interval"),
            event = events.recv(), if events_open => match event {
                Ok(ConnectivityEvent::Online) => shared.trigger("online"),
                Ok(ConnectivityEvent::Offline) => {
                    tracing::debug!(target: "sync::scheduler", "connectivity lost");
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        target: "sync::scheduler",
                        skipped,
                        "connectivity events lagged"
                    );
                    shared.trigger("online");
                }
                Err(RecvError::Closed) => {
                    events_open = false;
                }
            },
        }
    }

    tracing::info!(target: "sync::scheduler", "flush scheduler stopped");
}

/// Cancellation handle returned by [`FlushScheduler::start`]. Dropping it
/// stops the schedule as well.
pub struct FlushHandle {
    cancel_tx: watch::Sender<bool>,
    shared: Arc<SchedulerShared>,
}

impl FlushHandle {
    /// Stops the timer and the connectivity subscription. Returns at once; a
    /// pass already running is left to finish.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Fire a pass outside the schedule, through the same gate.
    pub fn trigger_now(&self) {
        self.shared.trigger("manual");
    }

    /// Run a pass and wait for it. `Ok(None)` when another pass holds the gate.
    pub async fn flush_now(&self) -> Result<Option<FlushSummary>, AppError> {
        self.shared.run_pass("manual").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::shared::tests::mocks::CountingWorker;
    use crate::infrastructure::network::ConnectivityMonitor;
    use tokio::time::sleep;

    fn config(interval_ms: u64, serialize_passes: bool) -> SchedulerConfig {
        SchedulerConfig {
            flush_interval: Duration::from_millis(interval_ms),
            serialize_passes,
        }
    }

    #[tokio::test]
    async fn flushes_immediately_on_start() {
        let worker = Arc::new(CountingWorker::default());
        let network = Arc::new(ConnectivityMonitor::new(true));

        let handle = FlushScheduler::start(worker.clone(), network, config(60_000, true));
        sleep(Duration::from_millis(50)).await;

        assert_eq!(worker.passes(), 1);
        handle.cancel();
    }

    #[tokio::test]
    async fn flushes_on_every_interval() {
        let worker = Arc::new(CountingWorker::default());
        let network = Arc::new(ConnectivityMonitor::new(true));

        let handle = FlushScheduler::start(worker.clone(), network, config(20, true));
        sleep(Duration::from_millis(150)).await;
        handle.cancel();

        assert!(worker.passes() >= 3, "passes = {}", worker.passes());
    }

    #[tokio::test]
    async fn offline_triggers_are_skipped_until_reconnect() {
        let worker = Arc::new(CountingWorker::default());
        let network = Arc::new(ConnectivityMonitor::new(false));

        let handle = FlushScheduler::start(worker.clone(), network.clone(), config(60_000, true));
        sleep(Duration::from_millis(50)).await;
        assert_eq!(worker.passes(), 0);

        network.set_online(true);
        sleep(Duration::from_millis(50)).await;
        assert_eq!(worker.passes(), 1);
        handle.cancel();
    }

    #[tokio::test]
    async fn cancel_stops_further_passes() {
        let worker = Arc::new(CountingWorker::default());
        let network = Arc::new(ConnectivityMonitor::new(true));

        let handle = FlushScheduler::start(worker.clone(), network.clone(), config(20, true));
        sleep(Duration::from_millis(50)).await;
        handle.cancel();
        assert!(handle.is_cancelled());
        sleep(Duration::from_millis(30)).await;
        let after_cancel = worker.passes();

        network.set_online(false);
        network.set_online(true);
        sleep(Duration::from_millis(100)).await;
        assert_eq!(worker.passes(), after_cancel);
    }

    #[tokio::test]
    async fn failing_passes_do_not_stop_the_schedule() {
        let worker = Arc::new(CountingWorker::failing());
        let network = Arc::new(ConnectivityMonitor::new(true));

        let handle = FlushScheduler::start(worker.clone(), network, config(20, true));
        sleep(Duration::from_millis(150)).await;
        handle.cancel();

        assert!(worker.passes() >= 3, "passes = {}", worker.passes());
    }

    #[tokio::test]
    async fn gate_skips_overlapping_triggers() {
        let worker = Arc::new(CountingWorker::slow(Duration::from_millis(100)));
        let network = Arc::new(ConnectivityMonitor::new(true));

        let handle = FlushScheduler::start(worker.clone(), network, config(60_000, true));
        sleep(Duration::from_millis(20)).await;
        handle.trigger_now();
        handle.trigger_now();
        assert!(handle.flush_now().await.unwrap().is_none());
        sleep(Duration::from_millis(150)).await;
        handle.cancel();

        assert_eq!(worker.passes(), 1);
        assert_eq!(worker.max_concurrency(), 1);
    }

    #[tokio::test]
    async fn ungated_passes_may_overlap() {
        let worker = Arc::new(CountingWorker::slow(Duration::from_millis(100)));
        let network = Arc::new(ConnectivityMonitor::new(true));

        let handle = FlushScheduler::start(worker.clone(), network, config(60_000, false));
        sleep(Duration::from_millis(20)).await;
        handle.trigger_now();
        sleep(Duration::from_millis(150)).await;
        handle.cancel();

        assert_eq!(worker.passes(), 2);
        assert_eq!(worker.max_concurrency(), 2);
    }
}
