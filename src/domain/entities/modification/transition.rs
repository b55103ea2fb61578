use crate::domain::value_objects::ModificationType;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// What to do when an entity whose unsynced Create never reached the remote
/// backend is deleted locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateDeletePolicy {
    /// The Create and the Delete cancel out; nothing is left to upload.
    #[default]
    Suppress,
    /// The Create is replaced by a Delete record.
    RecordDelete,
}

impl CreateDeletePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreateDeletePolicy::Suppress => "suppress",
            CreateDeletePolicy::RecordDelete => "record_delete",
        }
    }
}

impl fmt::Display for CreateDeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CreateDeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "suppress" => Ok(CreateDeletePolicy::Suppress),
            "record_delete" => Ok(CreateDeletePolicy::RecordDelete),
            other => Err(format!("Unknown create/delete policy: {}", other)),
        }
    }
}

/// Effect of one tracking event on the pending record of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "type", rename_all = "snake_case")]
pub enum Transition {
    /// No pending record existed; insert one of the given type.
    Insert(ModificationType),
    /// Keep the pending record and its type; refresh `modified_at` and `entity_name`.
    Touch,
    /// Remove the pending record(s) and insert a fresh one of the given type.
    Replace(ModificationType),
    /// Remove the pending record(s) and leave nothing behind.
    Discard,
}

impl Transition {
    /// Consolidates `incoming` into the entity's current pending state.
    pub fn resolve(
        existing: Option<ModificationType>,
        incoming: ModificationType,
        policy: CreateDeletePolicy,
    ) -> Self {
        use ModificationType::{Create, Delete, Update};

        match (existing, incoming) {
            (None, kind) => Transition::Insert(kind),

            (Some(Create), Create) => Transition::Touch,
            (Some(Create), Update) => Transition::Touch,
            (Some(Create), Delete) => match policy {
                CreateDeletePolicy::Suppress => Transition::Discard,
                CreateDeletePolicy::RecordDelete => Transition::Replace(Delete),
            },

            // the remote already holds the entity, so a re-create is an update
            (Some(Update), Create) | (Some(Update), Update) => Transition::Replace(Update),
            (Some(Update), Delete) => Transition::Replace(Delete),

            // restored locally before the delete was uploaded
            (Some(Delete), Create) | (Some(Delete), Update) => Transition::Replace(Update),
            (Some(Delete), Delete) => Transition::Replace(Delete),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Insert(_) => "insert",
            Transition::Touch => "touch",
            Transition::Replace(_) => "replace",
            Transition::Discard => "discard",
        }
    }
}
