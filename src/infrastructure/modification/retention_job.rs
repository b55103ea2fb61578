use crate::application::services::ModificationTrackerTrait;
use crate::shared::config::RetentionConfig;
use crate::shared::error::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionReport {
    pub cutoff: DateTime<Utc>,
    pub removed: u64,
    pub ran_at: DateTime<Utc>,
}

/// Deletes synced log entries once they fall out of the retention window.
pub struct RetentionJob {
    tracker: Arc<dyn ModificationTrackerTrait>,
    retention: Duration,
    gate: Mutex<()>,
}

impl RetentionJob {
    pub fn new(tracker: Arc<dyn ModificationTrackerTrait>, retention_days: u32) -> Arc<Self> {
        Arc::new(Self {
            tracker,
            retention: Duration::days(i64::from(retention_days)),
            gate: Mutex::new(()),
        })
    }

    pub fn from_config(
        tracker: Arc<dyn ModificationTrackerTrait>,
        config: &RetentionConfig,
    ) -> Arc<Self> {
        Self::new(tracker, config.retention_days)
    }

    /// Purges with cutoff `now - retention`. Overlapping runs wait for each other.
    pub async fn run_once(&self) -> Result<RetentionReport> {
        let _gate = self.gate.lock().await;

        let ran_at = Utc::now();
        let cutoff = ran_at - self.retention;
        let removed = self.tracker.purge_synced_before(cutoff).await?;

        Ok(RetentionReport {
            cutoff,
            removed,
            ran_at,
        })
    }

    async fn run_guarded(&self) {
        match self.run_once().await {
            Ok(report) => info!(
                removed = report.removed,
                cutoff = %report.cutoff,
                "Retention pass completed"
            ),
            Err(err) => error!("Retention pass failed: {}", err),
        }
    }

    /// Runs the job every `interval` until the returned handle is aborted.
    pub fn spawn(self: &Arc<Self>, interval: std::time::Duration) -> JoinHandle<()> {
        let job = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                job.run_guarded().await;
            }
        })
    }
}
