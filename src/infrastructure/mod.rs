pub mod database;
pub mod network;
pub mod queue;
pub mod remote;
pub mod replication;
pub mod session;

pub use database::{DatabaseHandle, SqliteRecordStore};
pub use network::{ConnectivityMonitor, HttpConnectivityProbe};
pub use queue::SqliteWriteQueueStore;
pub use remote::PostgrestRecordApi;
pub use replication::{ChannelFeed, SqliteReplicatedWriter};
pub use session::StaticSession;
