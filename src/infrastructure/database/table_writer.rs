//! Row writes into the replicated application tables, shared by optimistic
//! local mutations and the read-path replicator.

use crate::domain::entities::{LocalMutation, RowChange, REPLICATED_TABLES};
use crate::domain::value_objects::{RecordId, TargetTable, WritePayload};
use crate::shared::error::AppError;
use serde_json::Value;
use sqlx::sqlite::{Sqlite, SqliteArguments};
use sqlx::query::Query;
use sqlx::SqliteConnection;
use std::collections::HashSet;

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

pub async fn apply_local_mutation(
    conn: &mut SqliteConnection,
    mutation: &LocalMutation,
) -> Result<(), AppError> {
    match mutation {
        LocalMutation::Upsert { table, row } => upsert_row(conn, table, row).await,
        LocalMutation::Patch { table, id, changes } => patch_row(conn, table, id, changes).await,
        LocalMutation::Delete { table, id } => delete_row(conn, table, id).await,
    }
}

pub async fn apply_row_change(
    conn: &mut SqliteConnection,
    change: &RowChange,
) -> Result<(), AppError> {
    match change {
        RowChange::Upsert { table, row } => upsert_row(conn, table, row).await,
        RowChange::Delete { table, id } => delete_row(conn, table, id).await,
    }
}

/// Insert the row, overwriting any existing row with the same `id`.
/// Columns the local table does not have are dropped.
pub async fn upsert_row(
    conn: &mut SqliteConnection,
    table: &TargetTable,
    row: &WritePayload,
) -> Result<(), AppError> {
    let known = table_columns(conn, table).await?;
    if row.get("id").map_or(true, Value::is_null) {
        return Err(AppError::ValidationError(format!(
            "Row for {table} has no id"
        )));
    }

    let columns: Vec<(&String, &Value)> = row
        .columns()
        .filter(|(column, _)| known.contains(column.as_str()))
        .collect();

    let names: Vec<String> = columns.iter().map(|(column, _)| quote(column)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    let updates: Vec<String> = columns
        .iter()
        .filter(|(column, _)| column.as_str() != "id")
        .map(|(column, _)| format!("{0} = excluded.{0}", quote(column)))
        .collect();

    let conflict = if updates.is_empty() {
        "DO NOTHING".to_string()
    } else {
        format!("DO UPDATE SET {}", updates.join(", "))
    };
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT(id) {}",
        quote(table.as_str()),
        names.join(", "),
        placeholders.join(", "),
        conflict
    );

    let mut query = sqlx::query(&sql);
    for (_, value) in &columns {
        query = bind_json(query, value);
    }
    query.execute(&mut *conn).await?;
    Ok(())
}

pub async fn patch_row(
    conn: &mut SqliteConnection,
    table: &TargetTable,
    id: &RecordId,
    changes: &WritePayload,
) -> Result<(), AppError> {
    let known = table_columns(conn, table).await?;
    let columns: Vec<(&String, &Value)> = changes
        .columns()
        .filter(|(column, _)| column.as_str() != "id" && known.contains(column.as_str()))
        .collect();
    if columns.is_empty() {
        return Ok(());
    }

    let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{} = ?{}", quote(column), i + 1))
        .collect();
    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?{}",
        quote(table.as_str()),
        assignments.join(", "),
        columns.len() + 1
    );

    let mut query = sqlx::query(&sql);
    for (_, value) in &columns {
        query = bind_json(query, value);
    }
    query.bind(id.as_str()).execute(&mut *conn).await?;
    Ok(())
}

pub async fn delete_row(
    conn: &mut SqliteConnection,
    table: &TargetTable,
    id: &RecordId,
) -> Result<(), AppError> {
    ensure_replicated(table)?;
    let sql = format!("DELETE FROM {} WHERE id = ?1", quote(table.as_str()));
    sqlx::query(&sql)
        .bind(id.as_str())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn table_columns(
    conn: &mut SqliteConnection,
    table: &TargetTable,
) -> Result<HashSet<String>, AppError> {
    ensure_replicated(table)?;
    let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info(?1)")
        .bind(table.as_str())
        .fetch_all(&mut *conn)
        .await?;
    Ok(columns.into_iter().collect())
}

fn ensure_replicated(table: &TargetTable) -> Result<(), AppError> {
    if REPLICATED_TABLES.contains(&table.as_str()) {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!(
            "Table {table} is not replicated locally"
        )))
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn bind_json<'q>(query: SqliteQuery<'q>, value: &Value) -> SqliteQuery<'q> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(flag) => query.bind(i64::from(*flag)),
        Value::Number(number) => match number.as_i64() {
            Some(int) => query.bind(int),
            None => query.bind(number.as_f64()),
        },
        Value::String(text) => query.bind(text.clone()),
        other => query.bind(other.to_string()),
    }
}
