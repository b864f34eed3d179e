pub mod engine;
pub mod enqueuer;
pub mod flusher;
pub mod lifecycle;
pub mod mutations;
pub mod replicator;
pub mod scheduler;

pub use engine::{EngineStatus, QueueSyncEngine, QueueSyncEngineParts, SyncEngine};
pub use enqueuer::MutationEnqueuer;
pub use flusher::{FlushWorker, QueueFlusher};
pub use lifecycle::{LifecycleEvent, ObserverDisposer, Observers};
pub use mutations::TodoMutations;
pub use replicator::{ReadReplicator, ReplicationHandle};
pub use scheduler::{FlushHandle, FlushScheduler, SchedulerConfig};
