use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ModificationRecordRow {
    pub seq: i64,
    pub id: String,
    pub entity_type: String,
    pub entity_id: String,
    pub entity_name: Option<String>,
    pub location_id: String,
    pub modification_type: String,
    pub modified_at: i64,
    pub is_synced: bool,
    pub synced_at: Option<i64>,
    pub sync_attempts: i64,
    pub last_sync_error: Option<String>,
}
