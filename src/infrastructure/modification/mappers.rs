use super::rows::ModificationRecordRow;
use crate::domain::entities::modification::ModificationRecord;
use crate::domain::value_objects::{
    EntityId, EntityType, LocationId, ModificationId, ModificationType,
};
use crate::shared::error::StorageError;
use chrono::{DateTime, Utc};

pub fn domain_record_from_row(
    row: ModificationRecordRow,
) -> Result<ModificationRecord, StorageError> {
    let corrupt = |reason: String| StorageError::CorruptRow {
        record: row.id.clone(),
        reason,
    };

    let id = ModificationId::parse(&row.id).map_err(corrupt)?;
    let entity_type = EntityType::new(row.entity_type.clone()).map_err(corrupt)?;
    let entity_id = EntityId::parse(&row.entity_id).map_err(corrupt)?;
    let location_id = LocationId::parse(&row.location_id).map_err(corrupt)?;
    let modification_type = row
        .modification_type
        .parse::<ModificationType>()
        .map_err(corrupt)?;
    let modified_at = timestamp_from_millis(row.modified_at)
        .ok_or_else(|| corrupt(format!("invalid modified_at {}", row.modified_at)))?;
    let synced_at = row
        .synced_at
        .map(|ms| {
            timestamp_from_millis(ms).ok_or_else(|| corrupt(format!("invalid synced_at {}", ms)))
        })
        .transpose()?;
    let sync_attempts = u32::try_from(row.sync_attempts)
        .map_err(|_| corrupt(format!("invalid sync_attempts {}", row.sync_attempts)))?;

    Ok(ModificationRecord {
        id,
        entity_type,
        entity_id,
        entity_name: row.entity_name.clone(),
        location_id,
        modification_type,
        modified_at,
        is_synced: row.is_synced,
        synced_at,
        sync_attempts,
        last_sync_error: row.last_sync_error.clone(),
    })
}

pub fn timestamp_from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
}
