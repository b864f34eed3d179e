use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStatus {
    Pending,
    Completed,
    Error,
}

impl WriteStatus {
    /// Statuses that take part in the next flush pass.
    pub const REPLAYABLE: [WriteStatus; 2] = [WriteStatus::Pending, WriteStatus::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            WriteStatus::Pending => "pending",
            WriteStatus::Completed => "completed",
            WriteStatus::Error => "error",
        }
    }

    pub fn is_replayable(&self) -> bool {
        Self::REPLAYABLE.contains(self)
    }

    /// Completed is terminal and nothing returns to pending.
    pub fn can_transition_to(&self, next: WriteStatus) -> bool {
        match (self, next) {
            (WriteStatus::Pending, WriteStatus::Completed) => true,
            (WriteStatus::Pending, WriteStatus::Error) => true,
            (WriteStatus::Error, WriteStatus::Completed) => true,
            (WriteStatus::Error, WriteStatus::Error) => true,
            _ => false,
        }
    }
}

impl fmt::Display for WriteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(WriteStatus::Pending),
            "completed" => Ok(WriteStatus::Completed),
            "error" => Ok(WriteStatus::Error),
            other => Err(format!("Unknown write status: {other}")),
        }
    }
}
