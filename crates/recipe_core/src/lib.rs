//! Core domain logic for the recipe backend.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod media;
pub mod model;
pub mod password;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use media::{media_url, MediaCategory, MediaError, MediaStore};
pub use model::attribute::{
    Attribute, AttributeId, AttributeInput, AttributeKind, Ingredient, Tag,
};
pub use model::banner::{BannerId, BannerImage};
pub use model::recipe::{
    Price, Recipe, RecipeChanges, RecipeDraft, RecipeId, RecipeValidationError,
};
pub use model::user::{normalize_email, User, UserId, UserValidationError};
pub use repo::attribute_repo::{AttributeRepository, SqliteAttributeRepository};
pub use repo::banner_repo::{BannerRepository, SqliteBannerRepository};
pub use repo::recipe_repo::{RecipeListQuery, RecipeRepository, SqliteRecipeRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::attribute_service::{AttributeService, AttributeServiceError};
pub use service::banner_service::{BannerService, BannerServiceError};
pub use service::recipe_service::{RecipeService, RecipeServiceError};
pub use service::user_service::{UserChanges, UserService, UserServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
