pub mod payload;
pub mod record_id;
pub mod target_table;
pub mod write_operation;
pub mod write_queue_id;
pub mod write_status;

pub use payload::WritePayload;
pub use record_id::RecordId;
pub use target_table::TargetTable;
pub use write_operation::WriteOperation;
pub use write_queue_id::WriteQueueId;
pub use write_status::WriteStatus;
