use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of mutation recorded in the write queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOperation {
    Insert,
    Update,
    Delete,
}

impl WriteOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteOperation::Insert => "insert",
            WriteOperation::Update => "update",
            WriteOperation::Delete => "delete",
        }
    }

    /// Update and delete address an existing remote row and need its id.
    pub fn requires_record_id(&self) -> bool {
        matches!(self, WriteOperation::Update | WriteOperation::Delete)
    }
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteOperation {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "insert" => Ok(WriteOperation::Insert),
            "update" => Ok(WriteOperation::Update),
            "delete" => Ok(WriteOperation::Delete),
            other => Err(format!("Unknown write operation: {other}")),
        }
    }
}
