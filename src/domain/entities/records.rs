//! Rows of the replicated application tables.

use serde::{Deserialize, Serialize};

pub const LISTS_TABLE: &str = "lists";
pub const TODOS_TABLE: &str = "todos";

/// Tables that both the read path and local mutations write into.
pub const REPLICATED_TABLES: [&str; 2] = [LISTS_TABLE, TODOS_TABLE];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct ListRecord {
    pub id: String,
    pub created_at: Option<String>,
    pub name: Option<String>,
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct TodoRecord {
    pub id: String,
    pub list_id: Option<String>,
    pub created_at: Option<String>,
    pub completed_at: Option<String>,
    pub description: Option<String>,
    pub created_by: Option<String>,
    pub completed_by: Option<String>,
    pub completed: bool,
}

/// A list together with its task counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct ListSummary {
    pub id: String,
    pub created_at: Option<String>,
    pub name: Option<String>,
    pub owner_id: Option<String>,
    pub total_tasks: i64,
    pub completed_tasks: i64,
}
