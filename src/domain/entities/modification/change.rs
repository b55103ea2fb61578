use crate::domain::value_objects::{EntityId, EntityType, LocationId, ModificationType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a tracked entity; the unit of serialization for consolidation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub entity_type: EntityType,
    pub entity_id: EntityId,
}

impl EntityKey {
    pub fn new(entity_type: EntityType, entity_id: EntityId) -> Self {
        Self {
            entity_type,
            entity_id,
        }
    }
}

/// Entity descriptor handed to the tracker by a repository after a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedChange {
    pub entity_type: EntityType,
    pub entity_id: EntityId,
    pub entity_name: Option<String>,
    pub location_id: LocationId,
}

impl TrackedChange {
    pub fn new(entity_type: EntityType, entity_id: EntityId, location_id: LocationId) -> Self {
        Self {
            entity_type,
            entity_id,
            entity_name: None,
            location_id,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.entity_name = if name.trim().is_empty() {
            None
        } else {
            Some(name)
        };
        self
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.entity_type.clone(), self.entity_id)
    }
}

/// A change stamped with the operation and the instant it was observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModificationEvent {
    pub change: TrackedChange,
    pub modification_type: ModificationType,
    pub occurred_at: DateTime<Utc>,
}

impl ModificationEvent {
    pub fn new(
        change: TrackedChange,
        modification_type: ModificationType,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            change,
            modification_type,
            occurred_at,
        }
    }

    pub fn key(&self) -> EntityKey {
        self.change.key()
    }
}
