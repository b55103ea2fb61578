use super::mappers::{domain_record_from_row, timestamp_from_millis};
use super::queries::{
    DELETE_PENDING_BY_ENTITY, DELETE_PENDING_EXCEPT, INSERT_RECORD, LOCK_PENDING_BY_ENTITY,
    MARK_SYNCED, PURGE_ENTITY, PURGE_SYNCED_BEFORE, RECORD_FAILURE, SELECT_LAST_SYNCED_AT,
    SELECT_PENDING_COUNTS, SELECT_RECORD_BY_ID, SELECT_SYNCED_BY_LOCATION,
    SELECT_UNSYNCED_BY_LOCATION, SELECT_WORST_PENDING_ERROR, TOUCH_PENDING,
};
use super::rows::ModificationRecordRow;
use crate::application::ports::modification_store::ModificationStore;
use crate::domain::entities::modification::{
    CreateDeletePolicy, EntityKey, ModificationEvent, ModificationRecord, PendingSummary,
    TrackOutcome, TrackedChange, Transition,
};
use crate::domain::value_objects::{
    EntityId, EntityType, LocationId, ModificationId, ModificationType,
};
use crate::infrastructure::database::ConnectionPool;
use crate::shared::error::{AppError, StorageError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqliteConnection, Transaction};
use tracing::warn;

/// SQLite-backed modification log.
pub struct SqliteModificationStore {
    pool: ConnectionPool,
}

impl SqliteModificationStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Opens a transaction that a repository can share between its entity
    /// write and [`track_with_tx`](Self::track_with_tx).
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, AppError> {
        Ok(self.pool.get_pool().begin().await?)
    }

    /// Tracks a change inside the caller's transaction, so that the business
    /// entity and its log entry commit or roll back together.
    ///
    /// Unlike the tracker this does not take the per-entity lock; a racing
    /// writer for the same entity is rejected by the pending-entity unique index.
    pub async fn track_with_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        change: TrackedChange,
        modification_type: ModificationType,
        policy: CreateDeletePolicy,
    ) -> Result<TrackOutcome, AppError> {
        let event = ModificationEvent::new(change, modification_type, Utc::now());
        consolidate(&mut **tx, &event, policy).await
    }
}

async fn consolidate(
    conn: &mut SqliteConnection,
    event: &ModificationEvent,
    policy: CreateDeletePolicy,
) -> Result<TrackOutcome, AppError> {
    let key = event.key();
    let rows: Vec<ModificationRecordRow> = sqlx::query_as(LOCK_PENDING_BY_ENTITY)
        .bind(key.entity_type.as_str())
        .bind(key.entity_id.to_string())
        .fetch_all(&mut *conn)
        .await?;
    let pending = rows
        .into_iter()
        .map(domain_record_from_row)
        .collect::<Result<Vec<_>, StorageError>>()?;

    if pending.len() > 1 {
        warn!(
            entity_type = %key.entity_type,
            entity_id = %key.entity_id,
            count = pending.len(),
            "Multiple pending modification records; consolidating"
        );
    }

    // a pending Create wins: the entity does not exist remotely yet
    let current = pending
        .iter()
        .find(|record| record.modification_type == ModificationType::Create)
        .or_else(|| pending.iter().max_by_key(|record| record.modified_at));

    let transition = Transition::resolve(
        current.map(|record| record.modification_type),
        event.modification_type,
        policy,
    );

    let record = match transition {
        Transition::Touch => {
            let Some(current) = current else {
                return Err(AppError::Internal(
                    "touch resolved without a pending record".to_string(),
                ));
            };
            let touched = current.clone().touched_by(event);

            sqlx::query(TOUCH_PENDING)
                .bind(touched.id.to_string())
                .bind(touched.modified_at.timestamp_millis())
                .bind(&touched.entity_name)
                .execute(&mut *conn)
                .await?;
            if pending.len() > 1 {
                sqlx::query(DELETE_PENDING_EXCEPT)
                    .bind(key.entity_type.as_str())
                    .bind(key.entity_id.to_string())
                    .bind(touched.id.to_string())
                    .execute(&mut *conn)
                    .await?;
            }
            Some(touched)
        }
        Transition::Insert(kind) => {
            let record = ModificationRecord::pending(event, kind);
            insert_record(conn, &record).await?;
            Some(record)
        }
        Transition::Replace(kind) => {
            delete_pending(conn, &key).await?;
            let record = ModificationRecord::pending(event, kind);
            insert_record(conn, &record).await?;
            Some(record)
        }
        Transition::Discard => {
            delete_pending(conn, &key).await?;
            None
        }
    };

    Ok(TrackOutcome::new(transition, record))
}

async fn insert_record(
    conn: &mut SqliteConnection,
    record: &ModificationRecord,
) -> Result<(), AppError> {
    sqlx::query(INSERT_RECORD)
        .bind(record.id.to_string())
        .bind(record.entity_type.as_str())
        .bind(record.entity_id.to_string())
        .bind(&record.entity_name)
        .bind(record.location_id.to_string())
        .bind(record.modification_type.as_str())
        .bind(record.modified_at.timestamp_millis())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn delete_pending(conn: &mut SqliteConnection, key: &EntityKey) -> Result<u64, AppError> {
    let result = sqlx::query(DELETE_PENDING_BY_ENTITY)
        .bind(key.entity_type.as_str())
        .bind(key.entity_id.to_string())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

fn map_rows(rows: Vec<ModificationRecordRow>) -> Result<Vec<ModificationRecord>, AppError> {
    rows.into_iter()
        .map(|row| domain_record_from_row(row).map_err(AppError::from))
        .collect()
}

#[async_trait]
impl ModificationStore for SqliteModificationStore {
    async fn apply_event(
        &self,
        event: &ModificationEvent,
        policy: CreateDeletePolicy,
    ) -> Result<TrackOutcome, AppError> {
        let mut tx = self.pool.get_pool().begin().await?;
        let outcome = consolidate(&mut *tx, event, policy).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    async fn mark_synced(
        &self,
        id: &ModificationId,
        synced_at: DateTime<Utc>,
        observed_modified_at: Option<DateTime<Utc>>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(MARK_SYNCED)
            .bind(id.to_string())
            .bind(synced_at.timestamp_millis())
            .bind(observed_modified_at.map(|at| at.timestamp_millis()))
            .execute(self.pool.get_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_failure(
        &self,
        id: &ModificationId,
        error_message: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(RECORD_FAILURE)
            .bind(id.to_string())
            .bind(error_message)
            .execute(self.pool.get_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_record(
        &self,
        id: &ModificationId,
    ) -> Result<Option<ModificationRecord>, AppError> {
        let row: Option<ModificationRecordRow> = sqlx::query_as(SELECT_RECORD_BY_ID)
            .bind(id.to_string())
            .fetch_optional(self.pool.get_pool())
            .await?;

        match row {
            Some(row) => Ok(Some(domain_record_from_row(row)?)),
            None => Ok(None),
        }
    }

    async fn list_unsynced(
        &self,
        location_id: &LocationId,
    ) -> Result<Vec<ModificationRecord>, AppError> {
        let rows: Vec<ModificationRecordRow> = sqlx::query_as(SELECT_UNSYNCED_BY_LOCATION)
            .bind(location_id.to_string())
            .fetch_all(self.pool.get_pool())
            .await?;
        map_rows(rows)
    }

    async fn list_synced(
        &self,
        location_id: &LocationId,
        limit: u32,
    ) -> Result<Vec<ModificationRecord>, AppError> {
        let rows: Vec<ModificationRecordRow> = sqlx::query_as(SELECT_SYNCED_BY_LOCATION)
            .bind(location_id.to_string())
            .bind(i64::from(limit))
            .fetch_all(self.pool.get_pool())
            .await?;
        map_rows(rows)
    }

    async fn last_synced_at(
        &self,
        location_id: &LocationId,
    ) -> Result<Option<DateTime<Utc>>, AppError> {
        let latest: Option<i64> = sqlx::query_scalar(SELECT_LAST_SYNCED_AT)
            .bind(location_id.to_string())
            .fetch_one(self.pool.get_pool())
            .await?;

        latest
            .map(|ms| {
                timestamp_from_millis(ms).ok_or_else(|| {
                    AppError::from(StorageError::CorruptRow {
                        record: format!("location {}", location_id),
                        reason: format!("invalid synced_at {}", ms),
                    })
                })
            })
            .transpose()
    }

    async fn pending_summary(&self, location_id: &LocationId) -> Result<PendingSummary, AppError> {
        let (pending_count, max_attempts): (i64, i64) = sqlx::query_as(SELECT_PENDING_COUNTS)
            .bind(location_id.to_string())
            .fetch_one(self.pool.get_pool())
            .await?;
        let last_error: Option<String> = sqlx::query_scalar(SELECT_WORST_PENDING_ERROR)
            .bind(location_id.to_string())
            .fetch_optional(self.pool.get_pool())
            .await?;

        Ok(PendingSummary {
            pending_count: u64::try_from(pending_count).unwrap_or(0),
            max_attempts: u32::try_from(max_attempts).unwrap_or(u32::MAX),
            last_error,
        })
    }

    async fn purge_synced_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(PURGE_SYNCED_BEFORE)
            .bind(cutoff.timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;
        Ok(result.rows_affected())
    }

    async fn purge_entity(
        &self,
        entity_type: &EntityType,
        entity_id: &EntityId,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(PURGE_ENTITY)
            .bind(entity_type.as_str())
            .bind(entity_id.to_string())
            .execute(self.pool.get_pool())
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Executor;
    use uuid::Uuid;

    async fn setup_store() -> (SqliteModificationStore, ConnectionPool) {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        (SqliteModificationStore::new(pool.clone()), pool)
    }

    fn change() -> TrackedChange {
        TrackedChange::new(
            EntityType::menu_item(),
            EntityId::new(Uuid::new_v4()),
            LocationId::new(Uuid::new_v4()),
        )
        .with_name("Margherita")
    }

    async fn pending_count(pool: &ConnectionPool, change: &TrackedChange) -> i64 {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM modification_records WHERE entity_id = ?1 AND is_synced = 0",
        )
        .bind(change.entity_id.to_string())
        .fetch_one(pool.get_pool())
        .await
        .unwrap();
        count
    }

    #[tokio::test]
    async fn test_unique_index_rejects_second_pending_row() {
        let (store, pool) = setup_store().await;
        let change = change();
        let event = ModificationEvent::new(change.clone(), ModificationType::Create, Utc::now());
        store
            .apply_event(&event, CreateDeletePolicy::Suppress)
            .await
            .unwrap();

        let mut conn = pool.get_pool().acquire().await.unwrap();
        let duplicate = ModificationRecord::pending(&event, ModificationType::Update);
        let err = insert_record(&mut conn, &duplicate).await.unwrap_err();
        drop(conn);

        assert!(matches!(err, AppError::Storage(StorageError::Constraint(_))));
        assert_eq!(pending_count(&pool, &change).await, 1);
    }

    #[tokio::test]
    async fn test_legacy_duplicates_are_healed_on_touch() {
        let (store, pool) = setup_store().await;
        let change = change();

        // simulate a log written before the unique index existed
        pool.get_pool()
            .execute("DROP INDEX idx_modification_records_pending_entity")
            .await
            .unwrap();
        let mut conn = pool.get_pool().acquire().await.unwrap();
        let create = ModificationEvent::new(change.clone(), ModificationType::Create, Utc::now());
        insert_record(
            &mut conn,
            &ModificationRecord::pending(&create, ModificationType::Create),
        )
        .await
        .unwrap();
        insert_record(
            &mut conn,
            &ModificationRecord::pending(&create, ModificationType::Update),
        )
        .await
        .unwrap();
        drop(conn);

        let update = ModificationEvent::new(change.clone(), ModificationType::Update, Utc::now());
        let outcome = store
            .apply_event(&update, CreateDeletePolicy::Suppress)
            .await
            .unwrap();

        assert_eq!(outcome.transition, Transition::Touch);
        assert_eq!(
            outcome.record.map(|record| record.modification_type),
            Some(ModificationType::Create)
        );
        assert_eq!(pending_count(&pool, &change).await, 1);
    }

    #[tokio::test]
    async fn test_track_with_tx_rolls_back_with_caller() {
        let (store, pool) = setup_store().await;
        let change = change();

        let mut tx = store.begin().await.unwrap();
        store
            .track_with_tx(
                &mut tx,
                change.clone(),
                ModificationType::Create,
                CreateDeletePolicy::Suppress,
            )
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(pending_count(&pool, &change).await, 0);

        let mut tx = store.begin().await.unwrap();
        store
            .track_with_tx(
                &mut tx,
                change.clone(),
                ModificationType::Create,
                CreateDeletePolicy::Suppress,
            )
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(pending_count(&pool, &change).await, 1);
    }

    #[tokio::test]
    async fn test_mark_synced_is_not_repeated() {
        let (store, _pool) = setup_store().await;
        let event = ModificationEvent::new(change(), ModificationType::Update, Utc::now());
        let outcome = store
            .apply_event(&event, CreateDeletePolicy::Suppress)
            .await
            .unwrap();
        let id = outcome.record.unwrap().id;

        let first_sync = Utc::now();
        assert!(store.mark_synced(&id, first_sync, None).await.unwrap());
        assert!(!store
            .mark_synced(&id, first_sync + chrono::Duration::hours(1), None)
            .await
            .unwrap());
        assert!(!store.record_failure(&id, "late failure").await.unwrap());

        let record = store.find_record(&id).await.unwrap().unwrap();
        assert_eq!(
            record.synced_at.map(|at| at.timestamp_millis()),
            Some(first_sync.timestamp_millis())
        );
        assert_eq!(record.sync_attempts, 0);
    }

    #[tokio::test]
    async fn test_guarded_mark_synced_requires_matching_version() {
        let (store, _pool) = setup_store().await;
        let event = ModificationEvent::new(change(), ModificationType::Create, Utc::now());
        let record = store
            .apply_event(&event, CreateDeletePolicy::Suppress)
            .await
            .unwrap()
            .record
            .unwrap();

        let stale = record.modified_at - chrono::Duration::milliseconds(1);
        assert!(!store
            .mark_synced(&record.id, Utc::now(), Some(stale))
            .await
            .unwrap());
        assert!(store
            .mark_synced(&record.id, Utc::now(), Some(record.modified_at))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_pending_summary_reports_worst_record() {
        let (store, _pool) = setup_store().await;
        let location = LocationId::new(Uuid::new_v4());

        let mut ids = Vec::new();
        for name in ["Salt", "Pepper"] {
            let change = TrackedChange::new(
                EntityType::ingredient(),
                EntityId::new(Uuid::new_v4()),
                location,
            )
            .with_name(name);
            let event = ModificationEvent::new(change, ModificationType::Create, Utc::now());
            let outcome = store
                .apply_event(&event, CreateDeletePolicy::Suppress)
                .await
                .unwrap();
            ids.push(outcome.record.unwrap().id);
        }

        store.record_failure(&ids[0], "timeout").await.unwrap();
        store.record_failure(&ids[1], "timeout").await.unwrap();
        store.record_failure(&ids[1], "HTTP 500").await.unwrap();

        let summary = store.pending_summary(&location).await.unwrap();
        assert_eq!(summary.pending_count, 2);
        assert_eq!(summary.max_attempts, 2);
        assert_eq!(summary.last_error.as_deref(), Some("HTTP 500"));

        let empty = store
            .pending_summary(&LocationId::new(Uuid::new_v4()))
            .await
            .unwrap();
        assert!(empty.is_empty());
        assert!(empty.last_error.is_none());
    }
}
