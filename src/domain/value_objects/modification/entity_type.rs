use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_ENTITY_TYPE_LEN: usize = 64;

/// Logical type of a tracked business entity ("Ingredient", "Recipe", "MenuItem", ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityType(String);

impl EntityType {
    pub const INGREDIENT: &'static str = "Ingredient";
    pub const RECIPE: &'static str = "Recipe";
    pub const MENU_ITEM: &'static str = "MenuItem";

    pub fn new(value: String) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    pub fn ingredient() -> Self {
        Self(Self::INGREDIENT.to_string())
    }

    pub fn recipe() -> Self {
        Self(Self::RECIPE.to_string())
    }

    pub fn menu_item() -> Self {
        Self(Self::MENU_ITEM.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("Entity type cannot be empty".to_string());
        }
        if value.chars().count() > MAX_ENTITY_TYPE_LEN {
            return Err(format!(
                "Entity type cannot exceed {} characters",
                MAX_ENTITY_TYPE_LEN
            ));
        }
        Ok(())
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EntityType> for String {
    fn from(value: EntityType) -> Self {
        value.0
    }
}
