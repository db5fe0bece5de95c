//! Tag and ingredient model.
//!
//! Tags and ingredients share one shape: a user-owned name that recipes link
//! to through a many-to-many table. `AttributeKind` selects which of the two
//! tables a repository call operates on.
//!
//! # Invariants
//! - `(user_id, name)` is unique per kind.
//! - Names are trimmed and never blank.

use crate::model::recipe::RecipeValidationError;
use crate::model::user::UserId;
use serde::Deserialize;

/// Maximum stored attribute name length.
pub const ATTRIBUTE_NAME_MAX_CHARS: usize = 255;

/// Storage-assigned tag/ingredient identifier.
pub type AttributeId = i64;

/// Which recipe attribute table to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Tag,
    Ingredient,
}

impl AttributeKind {
    /// Owning table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Tag => "tags",
            Self::Ingredient => "ingredients",
        }
    }

    /// Recipe link table name.
    pub fn link_table(self) -> &'static str {
        match self {
            Self::Tag => "recipe_tags",
            Self::Ingredient => "recipe_ingredients",
        }
    }

    /// Foreign key column inside the link table.
    pub fn link_column(self) -> &'static str {
        match self {
            Self::Tag => "tag_id",
            Self::Ingredient => "ingredient_id",
        }
    }

    /// Singular label used in logs and error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Ingredient => "ingredient",
        }
    }

    /// Input field name for nested recipe payloads.
    pub fn field(self) -> &'static str {
        match self {
            Self::Tag => "tags",
            Self::Ingredient => "ingredients",
        }
    }
}

/// One stored tag or ingredient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub id: AttributeId,
    pub user_id: UserId,
    pub name: String,
}

pub type Tag = Attribute;
pub type Ingredient = Attribute;

/// Nested tag/ingredient input accepted on recipe writes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttributeInput {
    pub name: String,
}

impl AttributeInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Trims and validates one attribute name.
pub fn normalize_attribute_name(
    kind: AttributeKind,
    raw: &str,
) -> Result<String, RecipeValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RecipeValidationError::BlankAttributeName(kind));
    }
    if trimmed.chars().count() > ATTRIBUTE_NAME_MAX_CHARS {
        return Err(RecipeValidationError::AttributeNameTooLong {
            kind,
            max: ATTRIBUTE_NAME_MAX_CHARS,
        });
    }
    Ok(trimmed.to_string())
}
