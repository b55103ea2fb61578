use crate::domain::entities::modification::{
    CreateDeletePolicy, ModificationEvent, ModificationRecord, PendingSummary, TrackOutcome,
};
use crate::domain::value_objects::{EntityId, EntityType, LocationId, ModificationId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistent backing of the modification log.
///
/// Every method is one unit of work against the store. `apply_event` must run
/// its read-decide-write sequence inside a single transaction.
#[async_trait]
pub trait ModificationStore: Send + Sync {
    async fn apply_event(
        &self,
        event: &ModificationEvent,
        policy: CreateDeletePolicy,
    ) -> Result<TrackOutcome, AppError>;

    /// Returns `false` when the record no longer exists or is already synced.
    /// With `observed_modified_at` set, also when the record was touched since.
    async fn mark_synced(
        &self,
        id: &ModificationId,
        synced_at: DateTime<Utc>,
        observed_modified_at: Option<DateTime<Utc>>,
    ) -> Result<bool, AppError>;

    /// Returns `false` when no unsynced record with `id` exists.
    async fn record_failure(
        &self,
        id: &ModificationId,
        error_message: &str,
    ) -> Result<bool, AppError>;

    async fn find_record(&self, id: &ModificationId)
        -> Result<Option<ModificationRecord>, AppError>;

    async fn list_unsynced(
        &self,
        location_id: &LocationId,
    ) -> Result<Vec<ModificationRecord>, AppError>;

    async fn list_synced(
        &self,
        location_id: &LocationId,
        limit: u32,
    ) -> Result<Vec<ModificationRecord>, AppError>;

    async fn last_synced_at(
        &self,
        location_id: &LocationId,
    ) -> Result<Option<DateTime<Utc>>, AppError>;

    async fn pending_summary(&self, location_id: &LocationId) -> Result<PendingSummary, AppError>;

    async fn purge_synced_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;

    async fn purge_entity(
        &self,
        entity_type: &EntityType,
        entity_id: &EntityId,
    ) -> Result<u64, AppError>;
}
