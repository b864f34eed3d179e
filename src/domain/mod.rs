pub mod entities;
pub mod value_objects;

pub use entities::{FlushSummary, QueuedWrite, WriteDraft};
pub use value_objects::{
    RecordId, TargetTable, WriteOperation, WritePayload, WriteQueueId, WriteStatus,
};
