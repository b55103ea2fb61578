mod common;

use chrono::{Duration, Utc};
use common::{count_rows, ingredient, new_location, recipe, setup_tracker};
use menucost_sync::{AppConfig, ModificationTrackerTrait, RetentionJob, TrackerState};
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::test]
async fn test_purge_respects_the_cutoff() {
    let ctx = setup_tracker().await;
    let loc = new_location();
    let change = ingredient(loc, "Parmesan");

    let outcome = ctx.tracker.track_create(change.clone()).await.unwrap();
    ctx.tracker
        .mark_synced(&outcome.record.unwrap().id)
        .await
        .unwrap();

    let kept = ctx
        .tracker
        .purge_synced_before(Utc::now() - Duration::days(1))
        .await
        .unwrap();
    assert_eq!(kept, 0);
    assert_eq!(count_rows(&ctx.pool, &change).await, 1);

    let removed = ctx
        .tracker
        .purge_synced_before(Utc::now() + Duration::days(31))
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(count_rows(&ctx.pool, &change).await, 0);
    assert_eq!(ctx.tracker.metrics().purged_records, 1);
}

#[tokio::test]
async fn test_purge_never_touches_unsynced_records() {
    let ctx = setup_tracker().await;
    let loc = new_location();
    let change = ingredient(loc, "Anchovies");

    ctx.tracker.track_update(change.clone()).await.unwrap();

    let removed = ctx
        .tracker
        .purge_synced_before(Utc::now() + Duration::days(365))
        .await
        .unwrap();
    assert_eq!(removed, 0);
    assert_eq!(ctx.tracker.query_unsynced(&loc).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_purge_entity_removes_only_that_entity() {
    let ctx = setup_tracker().await;
    let loc = new_location();
    let doomed = recipe(loc, "Tiramisu");
    let survivor = recipe(loc, "Panna cotta");

    let created = ctx.tracker.track_create(doomed.clone()).await.unwrap();
    ctx.tracker
        .mark_synced(&created.record.unwrap().id)
        .await
        .unwrap();
    ctx.tracker.track_update(doomed.clone()).await.unwrap();
    ctx.tracker.track_create(survivor.clone()).await.unwrap();
    assert_eq!(count_rows(&ctx.pool, &doomed).await, 2);

    let removed = ctx
        .tracker
        .purge_entity(&doomed.entity_type, &doomed.entity_id)
        .await
        .unwrap();

    assert_eq!(removed, 2);
    assert_eq!(count_rows(&ctx.pool, &doomed).await, 0);
    assert_eq!(count_rows(&ctx.pool, &survivor).await, 1);

    let pending = ctx.tracker.query_unsynced(&loc).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].entity_id, survivor.entity_id);
}

#[tokio::test]
async fn test_purge_entity_for_unknown_entity_is_a_no_op() {
    let ctx = setup_tracker().await;
    let stranger = ingredient(new_location(), "Truffle");

    let removed = ctx
        .tracker
        .purge_entity(&stranger.entity_type, &stranger.entity_id)
        .await
        .unwrap();
    assert_eq!(removed, 0);
}

#[tokio::test]
async fn test_retention_job_purges_outside_window() {
    let ctx = setup_tracker().await;
    let loc = new_location();
    let change = ingredient(loc, "Capers");

    let outcome = ctx.tracker.track_create(change.clone()).await.unwrap();
    ctx.tracker
        .mark_synced(&outcome.record.unwrap().id)
        .await
        .unwrap();

    let tracker: Arc<dyn ModificationTrackerTrait> = ctx.tracker.clone();
    let job = RetentionJob::new(Arc::clone(&tracker), 30);
    let report = job.run_once().await.unwrap();
    assert_eq!(report.removed, 0);
    assert!(report.cutoff < report.ran_at);

    // age the synced record past the window
    let aged = (Utc::now() - Duration::days(45)).timestamp_millis();
    sqlx::query("UPDATE modification_records SET synced_at = ?1 WHERE is_synced = 1")
        .bind(aged)
        .execute(ctx.pool.get_pool())
        .await
        .unwrap();

    let report = job.run_once().await.unwrap();
    assert_eq!(report.removed, 1);
    assert_eq!(count_rows(&ctx.pool, &change).await, 0);
}

#[tokio::test]
async fn test_state_initializes_file_database() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("menucost.db");

    let mut config = AppConfig::default();
    config.database.url = format!("sqlite://{}", db_path.display());
    config.retention.interval_secs = 3600;

    let state = TrackerState::initialize(config).await.unwrap();
    let loc = new_location();
    state
        .tracker
        .track_create(ingredient(loc, "Shallots"))
        .await
        .unwrap();
    assert_eq!(state.tracker.query_unsynced(&loc).await.unwrap().len(), 1);

    let handle = state
        .start_background_jobs()
        .expect("retention enabled by default");
    handle.abort();

    state.shutdown().await;
    assert!(db_path.exists());
}

#[tokio::test]
async fn test_state_rejects_invalid_config() {
    let mut config = AppConfig::default();
    config.database.url = String::new();

    assert!(TrackerState::initialize(config).await.is_err());
}
