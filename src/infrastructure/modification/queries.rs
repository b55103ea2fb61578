//! SQL for the `modification_records` table.

// Write-locking read: the no-op UPDATE takes the database write lock before the
// pending rows are inspected, so the consolidation decision cannot go stale.
pub const LOCK_PENDING_BY_ENTITY: &str = r#"
    UPDATE modification_records
    SET modified_at = modified_at
    WHERE entity_type = ?1 AND entity_id = ?2 AND is_synced = 0
    RETURNING seq, id, entity_type, entity_id, entity_name, location_id,
              modification_type, modified_at, is_synced, synced_at,
              sync_attempts, last_sync_error
"#;

pub const SELECT_RECORD_BY_ID: &str = r#"
    SELECT seq, id, entity_type, entity_id, entity_name, location_id,
           modification_type, modified_at, is_synced, synced_at,
           sync_attempts, last_sync_error
    FROM modification_records
    WHERE id = ?1
"#;

pub const INSERT_RECORD: &str = r#"
    INSERT INTO modification_records (
        id, entity_type, entity_id, entity_name, location_id,
        modification_type, modified_at, is_synced, synced_at,
        sync_attempts, last_sync_error
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, NULL, 0, NULL)
"#;

pub const TOUCH_PENDING: &str = r#"
    UPDATE modification_records
    SET modified_at = ?2, entity_name = ?3
    WHERE id = ?1 AND is_synced = 0
"#;

pub const DELETE_PENDING_BY_ENTITY: &str = r#"
    DELETE FROM modification_records
    WHERE entity_type = ?1 AND entity_id = ?2 AND is_synced = 0
"#;

pub const DELETE_PENDING_EXCEPT: &str = r#"
    DELETE FROM modification_records
    WHERE entity_type = ?1 AND entity_id = ?2 AND is_synced = 0 AND id <> ?3
"#;

pub const MARK_SYNCED: &str = r#"
    UPDATE modification_records
    SET is_synced = 1, synced_at = ?2, last_sync_error = NULL
    WHERE id = ?1 AND is_synced = 0 AND (?3 IS NULL OR modified_at = ?3)
"#;

pub const RECORD_FAILURE: &str = r#"
    UPDATE modification_records
    SET sync_attempts = sync_attempts + 1, last_sync_error = ?2
    WHERE id = ?1 AND is_synced = 0
"#;

pub const SELECT_UNSYNCED_BY_LOCATION: &str = r#"
    SELECT seq, id, entity_type, entity_id, entity_name, location_id,
           modification_type, modified_at, is_synced, synced_at,
           sync_attempts, last_sync_error
    FROM modification_records
    WHERE location_id = ?1 AND is_synced = 0
    ORDER BY modified_at ASC, seq ASC
"#;

pub const SELECT_SYNCED_BY_LOCATION: &str = r#"
    SELECT seq, id, entity_type, entity_id, entity_name, location_id,
           modification_type, modified_at, is_synced, synced_at,
           sync_attempts, last_sync_error
    FROM modification_records
    WHERE location_id = ?1 AND is_synced = 1
    ORDER BY synced_at DESC, seq DESC
    LIMIT ?2
"#;

pub const SELECT_LAST_SYNCED_AT: &str = r#"
    SELECT MAX(synced_at)
    FROM modification_records
    WHERE location_id = ?1 AND is_synced = 1
"#;

pub const SELECT_PENDING_COUNTS: &str = r#"
    SELECT COUNT(*), COALESCE(MAX(sync_attempts), 0)
    FROM modification_records
    WHERE location_id = ?1 AND is_synced = 0
"#;

pub const SELECT_WORST_PENDING_ERROR: &str = r#"
    SELECT last_sync_error
    FROM modification_records
    WHERE location_id = ?1 AND is_synced = 0 AND last_sync_error IS NOT NULL
    ORDER BY sync_attempts DESC, modified_at DESC
    LIMIT 1
"#;

pub const PURGE_SYNCED_BEFORE: &str = r#"
    DELETE FROM modification_records
    WHERE is_synced = 1 AND synced_at < ?1
"#;

pub const PURGE_ENTITY: &str = r#"
    DELETE FROM modification_records
    WHERE entity_type = ?1 AND entity_id = ?2
"#;
