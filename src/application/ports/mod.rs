pub mod local_records;
pub mod network;
pub mod remote_records;
pub mod replication;
pub mod session;
pub mod write_queue_store;

pub use local_records::LocalRecordStore;
pub use network::{ConnectivityEvent, NetworkStatus};
pub use remote_records::{RemoteError, RemoteRecordApi, RetryClass};
pub use replication::{ReplicatedTableWriter, ReplicationFeed};
pub use session::{SessionCallback, SessionChange, SessionProvider};
pub use write_queue_store::WriteQueueStore;
