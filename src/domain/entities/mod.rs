pub mod commands;
pub mod flush_summary;
pub mod queue_snapshot;
pub mod queued_write;
pub mod records;
pub mod row_change;

pub use commands::{LocalMutation, WriteDraft};
pub use flush_summary::FlushSummary;
pub use queue_snapshot::{FailedWriteDigest, QueueSnapshot};
pub use queued_write::{QueuedWrite, ReplayCandidate, UndecodableWrite};
pub use records::{ListRecord, ListSummary, TodoRecord, LISTS_TABLE, REPLICATED_TABLES, TODOS_TABLE};
pub use row_change::RowChange;
