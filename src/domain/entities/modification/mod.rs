pub mod change;
pub mod pending_summary;
pub mod record;
pub mod track_outcome;
pub mod transition;

pub use change::{EntityKey, ModificationEvent, TrackedChange};
pub use pending_summary::PendingSummary;
pub use record::{truncate_error_message, ModificationRecord};
pub use track_outcome::TrackOutcome;
pub use transition::{CreateDeletePolicy, Transition};
