use serde::{Deserialize, Serialize};

pub use crate::shared::observers::{ObserverDisposer, Observers};

/// State transitions announced by the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    Initialized,
    SessionStarted { user_id: String },
    Connected,
    Disconnected,
}
