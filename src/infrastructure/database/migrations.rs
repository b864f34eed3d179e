use crate::shared::error::AppError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

const COMPLETED_FLAG_FIXUP: &str = "todos_completed_integer_flag";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixupOutcome {
    Applied { rows: u64 },
    AlreadyApplied,
}

pub async fn run(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::debug!(target: "db::migrations", "schema migrations applied");
    Ok(())
}

/// Rewrites legacy `todos.completed` values (text such as `'true'`, reals)
/// into integer 0/1. Runs at most once per database, tracked in
/// `_schema_fixups`. Failures are returned, never ignored.
pub async fn normalize_completed_flag(pool: &SqlitePool) -> Result<FixupOutcome, AppError> {
    let migration_err =
        |e: sqlx::Error| AppError::Migration(format!("{COMPLETED_FLAG_FIXUP}: {e}"));

    let mut tx = pool.begin().await.map_err(migration_err)?;

    let applied: Option<i64> = sqlx::query_scalar("SELECT 1 FROM _schema_fixups WHERE name = ?1")
        .bind(COMPLETED_FLAG_FIXUP)
        .fetch_optional(&mut *tx)
        .await
        .map_err(migration_err)?;
    if applied.is_some() {
        return Ok(FixupOutcome::AlreadyApplied);
    }

    let rows = sqlx::query(
        r#"
        UPDATE todos
        SET completed = CASE
            WHEN typeof(completed) IN ('integer', 'real') THEN (completed != 0)
            ELSE lower(trim(completed)) IN ('1', 'true', 't', 'yes', 'on')
        END
        WHERE typeof(completed) != 'integer' OR completed NOT IN (0, 1)
        "#,
    )
    .execute(&mut *tx)
    .await
    .map_err(migration_err)?
    .rows_affected();

    sqlx::query(
        "INSERT INTO _schema_fixups (name, applied_at, affected_rows) VALUES (?1, ?2, ?3)",
    )
    .bind(COMPLETED_FLAG_FIXUP)
    .bind(Utc::now().to_rfc3339())
    .bind(rows as i64)
    .execute(&mut *tx)
    .await
    .map_err(migration_err)?;

    tx.commit().await.map_err(migration_err)?;
    Ok(FixupOutcome::Applied { rows })
}
