use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical table a queued write applies to, e.g. `lists` or `todos`.
///
/// Restricted to plain SQL identifiers because the name is interpolated into
/// local statements and remote URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetTable(String);

impl TargetTable {
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        Self::validate(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(value: &str) -> Result<(), String> {
        let mut chars = value.chars();
        match chars.next() {
            None => return Err("Target table cannot be empty".to_string()),
            Some(first) if !(first.is_ascii_alphabetic() || first == '_') => {
                return Err(format!("Invalid target table name: {value}"));
            }
            _ => {}
        }
        if !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
            return Err(format!("Invalid target table name: {value}"));
        }
        Ok(())
    }
}

impl fmt::Display for TargetTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TargetTable> for String {
    fn from(value: TargetTable) -> Self {
        value.0
    }
}
