use std::sync::Arc;

use menucost_sync::application::ports::modification_store::ModificationStore;
use menucost_sync::shared::config::TrackerConfig;
use menucost_sync::{
    ConnectionPool, CreateDeletePolicy, EntityId, EntityType, LocationId, ModificationTracker,
    SqliteModificationStore, TrackedChange,
};
use tempfile::TempDir;
use uuid::Uuid;

pub struct TrackerTestContext {
    pub tracker: Arc<ModificationTracker>,
    pub store: Arc<SqliteModificationStore>,
    pub pool: ConnectionPool,
}

pub async fn setup_tracker() -> TrackerTestContext {
    setup_tracker_with_policy(CreateDeletePolicy::Suppress).await
}

pub async fn setup_tracker_with_policy(policy: CreateDeletePolicy) -> TrackerTestContext {
    let pool = ConnectionPool::from_memory()
        .await
        .expect("in-memory sqlite");
    pool.migrate().await.expect("migrations");
    build_context(pool, policy)
}

/// Tracker over a WAL database file with a multi-connection pool. Keep the
/// returned directory alive for the duration of the test.
#[allow(dead_code)]
pub async fn setup_file_tracker() -> (TempDir, TrackerTestContext) {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}", dir.path().join("tracker.db").display());
    let pool = ConnectionPool::new(&url).await.expect("file sqlite");
    pool.migrate().await.expect("migrations");
    (dir, build_context(pool, CreateDeletePolicy::Suppress))
}

pub fn build_context(pool: ConnectionPool, policy: CreateDeletePolicy) -> TrackerTestContext {
    let store = Arc::new(SqliteModificationStore::new(pool.clone()));
    let persistence: Arc<dyn ModificationStore> = store.clone();
    let config = TrackerConfig {
        create_delete_policy: policy,
        ..TrackerConfig::default()
    };

    TrackerTestContext {
        tracker: Arc::new(ModificationTracker::new(persistence, config)),
        store,
        pool,
    }
}

pub fn new_location() -> LocationId {
    LocationId::new(Uuid::new_v4())
}

pub fn ingredient(location: LocationId, name: &str) -> TrackedChange {
    TrackedChange::new(
        EntityType::ingredient(),
        EntityId::new(Uuid::new_v4()),
        location,
    )
    .with_name(name)
}

#[allow(dead_code)]
pub fn recipe(location: LocationId, name: &str) -> TrackedChange {
    TrackedChange::new(EntityType::recipe(), EntityId::new(Uuid::new_v4()), location)
        .with_name(name)
}

#[allow(dead_code)]
pub async fn count_pending_rows(pool: &ConnectionPool, change: &TrackedChange) -> i64 {
    let (count,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM modification_records
        WHERE entity_type = ?1 AND entity_id = ?2 AND is_synced = 0
        "#,
    )
    .bind(change.entity_type.as_str())
    .bind(change.entity_id.to_string())
    .fetch_one(pool.get_pool())
    .await
    .expect("pending row count");
    count
}

#[allow(dead_code)]
pub async fn count_rows(pool: &ConnectionPool, change: &TrackedChange) -> i64 {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM modification_records WHERE entity_type = ?1 AND entity_id = ?2",
    )
    .bind(change.entity_type.as_str())
    .bind(change.entity_id.to_string())
    .fetch_one(pool.get_pool())
    .await
    .expect("row count");
    count
}
