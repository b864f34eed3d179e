use crate::domain::value_objects::{RecordId, TargetTable, WritePayload};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of one remote operation. The display string is what ends up in
/// the queue row's `error_message`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("{0}")]
    Network(String),

    #[error("remote rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },
}

/// Retry policy classification for remote failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryClass {
    Retryable,
    Permanent,
    ReauthRequired,
}

impl RemoteError {
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => RemoteError::Unauthorized { status, message },
            _ => RemoteError::Rejected { status, message },
        }
    }

    pub fn retry_class(&self) -> RetryClass {
        match self {
            RemoteError::Network(_) => RetryClass::Retryable,
            RemoteError::Rejected { status, .. } => classify_http_status(*status),
            RemoteError::Unauthorized { .. } => RetryClass::ReauthRequired,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => RemoteError::from_status(status.as_u16(), err.to_string()),
            None => RemoteError::Network(err.to_string()),
        }
    }
}

/// Classify an HTTP status into retry behaviour.
pub fn classify_http_status(status: u16) -> RetryClass {
    match status {
        401 | 403 => RetryClass::ReauthRequired,
        408 | 409 | 423 | 425 | 429 => RetryClass::Retryable,
        500..=599 => RetryClass::Retryable,
        _ => RetryClass::Permanent,
    }
}

/// Per-table record operations of the remote system of record.
///
/// Every operation must be safe to repeat with the same arguments: entries
/// are replayed after partial failures.
#[async_trait]
pub trait RemoteRecordApi: Send + Sync {
    /// Insert or overwrite by primary key.
    async fn upsert(&self, table: &TargetTable, record: &WritePayload) -> Result<(), RemoteError>;

    async fn update_by_id(
        &self,
        table: &TargetTable,
        id: &RecordId,
        patch: &WritePayload,
    ) -> Result<(), RemoteError>;

    async fn delete_by_id(&self, table: &TargetTable, id: &RecordId) -> Result<(), RemoteError>;
}
