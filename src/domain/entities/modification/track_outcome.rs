use super::{ModificationRecord, Transition};
use serde::{Deserialize, Serialize};

/// Result of a tracking call: the applied transition and the entity's pending
/// record afterwards (`None` when the transition discarded it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackOutcome {
    pub transition: Transition,
    pub record: Option<ModificationRecord>,
}

impl TrackOutcome {
    pub fn new(transition: Transition, record: Option<ModificationRecord>) -> Self {
        Self { transition, record }
    }
}
