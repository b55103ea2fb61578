//! Local modification log and delta-sync queue.
//!
//! Repositories report every create/update/delete of an ingredient, recipe or
//! menu item to the [`ModificationTracker`]. It keeps at most one pending
//! record per entity, so the sync engine uploads only the net change.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::services::{
    ModificationTracker, ModificationTrackerTrait, TrackerMetricsSnapshot,
};
pub use domain::{
    CreateDeletePolicy, EntityId, EntityType, LocationId, ModificationId, ModificationRecord,
    ModificationType, PendingSummary, TrackOutcome, TrackedChange, Transition,
};
pub use infrastructure::database::ConnectionPool;
pub use infrastructure::modification::{RetentionJob, SqliteModificationStore};
pub use shared::{AppConfig, AppError, StorageError};
pub use state::TrackerState;

/// Installs the global `tracing` subscriber, honouring `RUST_LOG`.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "menucost_sync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
