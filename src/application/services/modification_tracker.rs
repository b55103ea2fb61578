use super::entity_locks::EntityLocks;
use super::tracker_metrics::{TrackerMetrics, TrackerMetricsSnapshot};
use crate::application::ports::modification_store::ModificationStore;
use crate::domain::entities::modification::{
    truncate_error_message, EntityKey, ModificationEvent, ModificationRecord, PendingSummary,
    TrackOutcome, TrackedChange,
};
use crate::domain::value_objects::{
    EntityId, EntityType, LocationId, ModificationId, ModificationType,
};
use crate::shared::config::TrackerConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[async_trait]
pub trait ModificationTrackerTrait: Send + Sync {
    async fn track_create(&self, change: TrackedChange) -> Result<TrackOutcome, AppError>;
    async fn track_update(&self, change: TrackedChange) -> Result<TrackOutcome, AppError>;
    async fn track_delete(&self, change: TrackedChange) -> Result<TrackOutcome, AppError>;
    async fn mark_synced(&self, record_id: &ModificationId) -> Result<bool, AppError>;
    /// Marks the record synced only if it was not touched after the sync engine
    /// read it, so an edit made during the upload stays pending.
    async fn mark_synced_if_unchanged(
        &self,
        record_id: &ModificationId,
        observed_modified_at: DateTime<Utc>,
    ) -> Result<bool, AppError>;
    async fn record_failure(
        &self,
        record_id: &ModificationId,
        error_message: &str,
    ) -> Result<bool, AppError>;
    async fn query_unsynced(
        &self,
        location_id: &LocationId,
    ) -> Result<Vec<ModificationRecord>, AppError>;
    async fn query_synced(
        &self,
        location_id: &LocationId,
        limit: u32,
    ) -> Result<Vec<ModificationRecord>, AppError>;
    async fn last_sync_time(
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

/// Maintains the modification log: consolidates tracking events per entity,
/// records sync outcomes and applies retention.
pub struct ModificationTracker {
    store: Arc<dyn ModificationStore>,
    locks: Arc<EntityLocks>,
    metrics: Arc<TrackerMetrics>,
    config: TrackerConfig,
}

impl ModificationTracker {
    pub fn new(store: Arc<dyn ModificationStore>, config: TrackerConfig) -> Self {
        Self {
            store,
            locks: Arc::new(EntityLocks::new()),
            metrics: Arc::new(TrackerMetrics::new()),
            config,
        }
    }

    pub fn metrics(&self) -> TrackerMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub async fn find_record(
        &self,
        record_id: &ModificationId,
    ) -> Result<Option<ModificationRecord>, AppError> {
        self.store.find_record(record_id).await
    }

    /// Runs the read-decide-write sequence for one entity.
    ///
    /// The work happens on a spawned task holding the entity lock, so a caller
    /// that stops waiting does not cut the transaction short.
    async fn track(
        &self,
        change: TrackedChange,
        modification_type: ModificationType,
    ) -> Result<TrackOutcome, AppError> {
        let store = Arc::clone(&self.store);
        let locks = Arc::clone(&self.locks);
        let metrics = Arc::clone(&self.metrics);
        let policy = self.config.create_delete_policy;

        let task = tokio::spawn(async move {
            let _guard = locks.acquire(change.key()).await;
            let event = ModificationEvent::new(change, modification_type, Utc::now());

            match store.apply_event(&event, policy).await {
                Ok(outcome) => {
                    metrics.record_transition(&outcome.transition);
                    debug!(
                        entity_type = %event.change.entity_type,
                        entity_id = %event.change.entity_id,
                        incoming = %modification_type,
                        transition = outcome.transition.as_str(),
                        "Tracked modification"
                    );
                    Ok(outcome)
                }
                Err(err) => {
                    metrics.record_tracking_failure();
                    Err(err)
                }
            }
        });

        task.await?
    }
}

#[async_trait]
impl ModificationTrackerTrait for ModificationTracker {
    async fn track_create(&self, change: TrackedChange) -> Result<TrackOutcome, AppError> {
        self.track(change, ModificationType::Create).await
    }

    async fn track_update(&self, change: TrackedChange) -> Result<TrackOutcome, AppError> {
        self.track(change, ModificationType::Update).await
    }

    async fn track_delete(&self, change: TrackedChange) -> Result<TrackOutcome, AppError> {
        self.track(change, ModificationType::Delete).await
    }

    async fn mark_synced(&self, record_id: &ModificationId) -> Result<bool, AppError> {
        let updated = self.store.mark_synced(record_id, Utc::now(), None).await?;
        if updated {
            self.metrics.record_marked_synced();
        } else {
            debug!(record_id = %record_id, "mark_synced skipped: record missing or already synced");
        }
        Ok(updated)
    }

    async fn mark_synced_if_unchanged(
        &self,
        record_id: &ModificationId,
        observed_modified_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let updated = self
            .store
            .mark_synced(record_id, Utc::now(), Some(observed_modified_at))
            .await?;
        if updated {
            self.metrics.record_marked_synced();
        } else {
            debug!(
                record_id = %record_id,
                observed = %observed_modified_at,
                "mark_synced skipped: record missing, already synced or touched during upload"
            );
        }
        Ok(updated)
    }

    async fn record_failure(
        &self,
        record_id: &ModificationId,
        error_message: &str,
    ) -> Result<bool, AppError> {
        let message = truncate_error_message(error_message, self.config.max_error_len);
        let updated = self.store.record_failure(record_id, &message).await?;
        if updated {
            self.metrics.record_sync_failure();
            warn!(record_id = %record_id, error = %message, "Sync attempt failed");
        }
        Ok(updated)
    }

    async fn query_unsynced(
        &self,
        location_id: &LocationId,
    ) -> Result<Vec<ModificationRecord>, AppError> {
        self.store.list_unsynced(location_id).await
    }

    async fn query_synced(
        &self,
        location_id: &LocationId,
        limit: u32,
    ) -> Result<Vec<ModificationRecord>, AppError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.store.list_synced(location_id, limit).await
    }

    async fn last_sync_time(
        &self,
        location_id: &LocationId,
    ) -> Result<Option<DateTime<Utc>>, AppError> {
        self.store.last_synced_at(location_id).await
    }

    async fn pending_summary(&self, location_id: &LocationId) -> Result<PendingSummary, AppError> {
        self.store.pending_summary(location_id).await
    }

    async fn purge_synced_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let removed = self.store.purge_synced_before(cutoff).await?;
        self.metrics.record_purge(removed);
        info!(cutoff = %cutoff, removed, "Purged synced modification records");
        Ok(removed)
    }

    async fn purge_entity(
        &self,
        entity_type: &EntityType,
        entity_id: &EntityId,
    ) -> Result<u64, AppError> {
        let key = EntityKey::new(entity_type.clone(), *entity_id);
        let _guard = self.locks.acquire(key).await;

        let removed = self.store.purge_entity(entity_type, entity_id).await?;
        self.metrics.record_purge(removed);
        info!(
            entity_type = %entity_type,
            entity_id = %entity_id,
            removed,
            "Purged modification history of destroyed entity"
        );
        Ok(removed)
    }
}
