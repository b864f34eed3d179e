pub mod connection_pool;
pub mod migrations;
pub mod record_store;
pub mod table_writer;

pub use connection_pool::DatabaseHandle;
pub use migrations::FixupOutcome;
pub use record_store::SqliteRecordStore;
