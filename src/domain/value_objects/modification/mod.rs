pub mod entity_id;
pub mod entity_type;
pub mod location_id;
pub mod modification_id;
pub mod modification_type;

pub use entity_id::EntityId;
pub use entity_type::EntityType;
pub use location_id::LocationId;
pub use modification_id::ModificationId;
pub use modification_type::ModificationType;
