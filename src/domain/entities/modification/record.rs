use super::change::{EntityKey, ModificationEvent};
use crate::domain::value_objects::{
    EntityId, EntityType, LocationId, ModificationId, ModificationType,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the local modification log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModificationRecord {
    pub id: ModificationId,
    pub entity_type: EntityType,
    pub entity_id: EntityId,
    pub entity_name: Option<String>,
    pub location_id: LocationId,
    pub modification_type: ModificationType,
    pub modified_at: DateTime<Utc>,
    pub is_synced: bool,
    pub synced_at: Option<DateTime<Utc>>,
    pub sync_attempts: u32,
    pub last_sync_error: Option<String>,
}

impl ModificationRecord {
    /// Fresh unsynced record describing `event` as a `modification_type` operation.
    pub fn pending(event: &ModificationEvent, modification_type: ModificationType) -> Self {
        Self {
            id: ModificationId::generate(),
            entity_type: event.change.entity_type.clone(),
            entity_id: event.change.entity_id,
            entity_name: event.change.entity_name.clone(),
            location_id: event.change.location_id,
            modification_type,
            modified_at: event.occurred_at,
            is_synced: false,
            synced_at: None,
            sync_attempts: 0,
            last_sync_error: None,
        }
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.entity_type.clone(), self.entity_id)
    }

    /// Applies a touch: the pending type is kept, the timestamp follows `event`
    /// and so does the label when `event` carries one.
    ///
    /// `modified_at` always moves forward by at least one millisecond, since the
    /// sync engine uses it to detect edits made while a record was uploading.
    pub fn touched_by(mut self, event: &ModificationEvent) -> Self {
        self.modified_at = event
            .occurred_at
            .max(self.modified_at + chrono::Duration::milliseconds(1));
        if let Some(name) = &event.change.entity_name {
            self.entity_name = Some(name.clone());
        }
        self
    }
}

/// Cuts a sync failure message down to at most `max_chars` characters.
pub fn truncate_error_message(message: &str, max_chars: usize) -> String {
    match message.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => message[..byte_idx].to_string(),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::modification::TrackedChange;
    use uuid::Uuid;

    fn sample_event() -> ModificationEvent {
        let change = TrackedChange::new(
            EntityType::ingredient(),
            EntityId::new(Uuid::new_v4()),
            LocationId::new(Uuid::new_v4()),
        )
        .with_name("Butter");
        ModificationEvent::new(change, ModificationType::Create, Utc::now())
    }

    #[test]
    fn pending_record_starts_unsynced() {
        let event = sample_event();
        let record = ModificationRecord::pending(&event, ModificationType::Create);

        assert!(!record.is_synced);
        assert!(record.synced_at.is_none());
        assert_eq!(record.sync_attempts, 0);
        assert_eq!(record.entity_name.as_deref(), Some("Butter"));
        assert_eq!(record.modified_at, event.occurred_at);
        assert_eq!(record.key(), event.key());
    }

    #[test]
    fn touch_keeps_identity_and_type() {
        let event = sample_event();
        let record = ModificationRecord::pending(&event, ModificationType::Create);

        let later = ModificationEvent::new(
            event.change.clone().with_name("Unsalted butter"),
            ModificationType::Update,
            event.occurred_at + chrono::Duration::seconds(5),
        );
        let touched = record.clone().touched_by(&later);

        assert_eq!(touched.id, record.id);
        assert_eq!(touched.modification_type, ModificationType::Create);
        assert_eq!(touched.entity_name.as_deref(), Some("Unsalted butter"));
        assert_eq!(touched.modified_at, later.occurred_at);
    }

    #[test]
    fn touch_in_the_same_millisecond_still_advances() {
        let event = sample_event();
        let record = ModificationRecord::pending(&event, ModificationType::Create);

        let touched = record.clone().touched_by(&event);

        assert_eq!(
            touched.modified_at,
            record.modified_at + chrono::Duration::milliseconds(1)
        );
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let message = "é".repeat(1500);
        let truncated = truncate_error_message(&message, 1000);
        assert_eq!(truncated.chars().count(), 1000);

        assert_eq!(truncate_error_message("timeout", 1000), "timeout");
    }
}
