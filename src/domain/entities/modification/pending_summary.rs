use serde::{Deserialize, Serialize};

/// Backlog digest for one location, as shown by the sync engine
/// ("N items pending sync, last error: ...").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSummary {
    pub pending_count: u64,
    pub max_attempts: u32,
    /// Error of the pending record with the most failed attempts.
    pub last_error: Option<String>,
}

impl PendingSummary {
    pub fn is_empty(&self) -> bool {
        self.pending_count == 0
    }
}
