use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Net operation the remote backend has to apply for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModificationType {
    Create,
    Update,
    Delete,
}

impl ModificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModificationType::Create => "Create",
            ModificationType::Update => "Update",
            ModificationType::Delete => "Delete",
        }
    }
}

impl fmt::Display for ModificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ModificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Create" => Ok(ModificationType::Create),
            "Update" => Ok(ModificationType::Update),
            "Delete" => Ok(ModificationType::Delete),
            other => Err(format!("Unknown modification type: {}", other)),
        }
    }
}
