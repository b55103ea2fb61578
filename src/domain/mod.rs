pub mod entities;
pub mod value_objects;

pub use entities::modification::{
    CreateDeletePolicy, EntityKey, ModificationEvent, ModificationRecord, PendingSummary,
    TrackOutcome, TrackedChange, Transition,
};
pub use value_objects::{EntityId, EntityType, LocationId, ModificationId, ModificationType};
