use crate::application::services::ModificationTracker;
use crate::infrastructure::database::ConnectionPool;
use crate::infrastructure::modification::{RetentionJob, SqliteModificationStore};
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Wired modification-tracking stack shared by repositories and the sync engine.
#[derive(Clone)]
pub struct TrackerState {
    pub pool: ConnectionPool,
    pub store: Arc<SqliteModificationStore>,
    pub tracker: Arc<ModificationTracker>,
    pub retention_job: Arc<RetentionJob>,
    config: AppConfig,
}

impl TrackerState {
    pub async fn initialize(config: AppConfig) -> anyhow::Result<Self> {
        config.validate().map_err(AppError::ConfigurationError)?;

        let pool = ConnectionPool::from_config(&config.database).await?;
        pool.migrate().await?;

        let store = Arc::new(SqliteModificationStore::new(pool.clone()));
        let tracker = Arc::new(ModificationTracker::new(store.clone(), config.tracker));
        let retention_job = RetentionJob::from_config(tracker.clone(), &config.retention);

        info!(
            database = %config.database.url,
            policy = %config.tracker.create_delete_policy,
            "Modification tracker initialized"
        );

        Ok(Self {
            pool,
            store,
            tracker,
            retention_job,
            config,
        })
    }

    /// Starts the periodic retention pass when it is enabled.
    pub fn start_background_jobs(&self) -> Option<JoinHandle<()>> {
        if !self.config.retention.enabled {
            return None;
        }
        let interval = Duration::from_secs(self.config.retention.interval_secs);
        Some(self.retention_job.spawn(interval))
    }

    pub async fn shutdown(&self) {
        self.pool.close().await;
    }
}
