pub mod entity_locks;
pub mod modification_tracker;
pub mod tracker_metrics;

pub use entity_locks::EntityLocks;
pub use modification_tracker::{ModificationTracker, ModificationTrackerTrait};
pub use tracker_metrics::{TrackerMetrics, TrackerMetricsSnapshot};
