pub mod modification;

pub use modification::{EntityId, EntityType, LocationId, ModificationId, ModificationType};
