pub(super) const INSERT_WRITE: &str = r#"
    INSERT INTO _write_queue (target_table, operation, data, record_id, status, created_at)
    VALUES (?1, ?2, ?3, ?4, 'pending', ?5)
"#;

pub(super) const SELECT_REPLAYABLE_WRITES: &str = r#"
    SELECT id, target_table, operation, data, record_id, status, created_at, error_message
    FROM _write_queue
    WHERE status IN (?1, ?2)
    ORDER BY id ASC
"#;

pub(super) const SELECT_WRITE_BY_ID: &str = r#"
    SELECT id, target_table, operation, data, record_id, status, created_at, error_message
    FROM _write_queue
    WHERE id = ?1
"#;

pub(super) const SELECT_WRITE_STATUS: &str = r#"
    SELECT status
    FROM _write_queue
    WHERE id = ?1
"#;

pub(super) const UPDATE_WRITE_STATUS: &str = r#"
    UPDATE _write_queue
    SET status = ?2,
        error_message = ?3
    WHERE id = ?1
      AND status = ?4
"#;

pub(super) const DELETE_COMPLETED_WRITES: &str = r#"
    DELETE FROM _write_queue
    WHERE status = 'completed'
"#;

pub(super) const COUNT_WRITES_BY_STATUS: &str = r#"
    SELECT status, COUNT(*) AS count
    FROM _write_queue
    GROUP BY status
"#;

pub(super) const SELECT_FAILED_WRITES: &str = r#"
    SELECT id, target_table, operation, error_message
    FROM _write_queue
    WHERE status = 'error'
    ORDER BY id ASC
    LIMIT ?1
"#;
