pub mod mappers;
mod queries;
pub mod rows;
pub mod sqlite_store;

pub use sqlite_store::SqliteWriteQueueStore;
