use crate::domain::entities::modification::Transition;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackerMetricsSnapshot {
    pub inserted: u64,
    pub touched: u64,
    pub replaced: u64,
    pub discarded: u64,
    pub tracking_failures: u64,
    pub marked_synced: u64,
    pub sync_failures_recorded: u64,
    pub purged_records: u64,
    pub last_tracked_ms: Option<u64>,
    pub last_purge_ms: Option<u64>,
}

/// In-process counters for one tracker instance.
#[derive(Debug, Default)]
pub struct TrackerMetrics {
    inserted: AtomicU64,
    touched: AtomicU64,
    replaced: AtomicU64,
    discarded: AtomicU64,
    tracking_failures: AtomicU64,
    marked_synced: AtomicU64,
    sync_failures_recorded: AtomicU64,
    purged_records: AtomicU64,
    last_tracked_ms: AtomicU64,
    last_purge_ms: AtomicU64,
}

impl TrackerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_transition(&self, transition: &Transition) {
        let counter = match transition {
            Transition::Insert(_) => &self.inserted,
            Transition::Touch => &self.touched,
            Transition::Replace(_) => &self.replaced,
            Transition::Discard => &self.discarded,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.last_tracked_ms
            .store(current_unix_ms(), Ordering::Relaxed);
    }

    pub fn record_tracking_failure(&self) {
        self.tracking_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_marked_synced(&self) {
        self.marked_synced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sync_failure(&self) {
        self.sync_failures_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_purge(&self, removed: u64) {
        self.purged_records.fetch_add(removed, Ordering::Relaxed);
        self.last_purge_ms
            .store(current_unix_ms(), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TrackerMetricsSnapshot {
        TrackerMetricsSnapshot {
            inserted: self.inserted.load(Ordering::Relaxed),
            touched: self.touched.load(Ordering::Relaxed),
            replaced: self.replaced.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            tracking_failures: self.tracking_failures.load(Ordering::Relaxed),
            marked_synced: self.marked_synced.load(Ordering::Relaxed),
            sync_failures_recorded: self.sync_failures_recorded.load(Ordering::Relaxed),
            purged_records: self.purged_records.load(Ordering::Relaxed),
            last_tracked_ms: to_option(self.last_tracked_ms.load(Ordering::Relaxed)),
            last_purge_ms: to_option(self.last_purge_ms.load(Ordering::Relaxed)),
        }
    }
}

fn to_option(value: u64) -> Option<u64> {
    if value == 0 {
        None
    } else {
        Some(value)
    }
}

fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}
