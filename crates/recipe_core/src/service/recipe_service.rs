//! Recipe use-case service.
//!
//! # Responsibility
//! - Validate recipe input and delegate nested writes to the repository.
//! - Resolve nested tags/ingredients with get-or-create in the requesting
//!   user's namespace.
//! - Attach uploaded images and clean up replaced files.
//!
//! # Invariants
//! - Create treats missing tag/ingredient lists as empty.
//! - Update leaves a link set untouched when its list is absent and replaces
//!   it (possibly with nothing) when present.
//! - Every read is scoped to the requesting user.

use crate::media::{MediaCategory, MediaError, MediaStore};
use crate::model::recipe::{Recipe, RecipeChanges, RecipeDraft, RecipeId, RecipeValidationError};
use crate::model::user::UserId;
use crate::repo::recipe_repo::{RecipeListQuery, RecipeRepository};
use crate::repo::RepoError;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for recipe use-cases.
#[derive(Debug)]
pub enum RecipeServiceError {
    Validation(RecipeValidationError),
    /// Recipe is missing or owned by another user.
    RecipeNotFound(RecipeId),
    Media(MediaError),
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for RecipeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::RecipeNotFound(id) => write!(f, "recipe not found: {id}"),
            Self::Media(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent recipe state: {details}"),
        }
    }
}

impl Error for RecipeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Media(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecipeValidationError> for RecipeServiceError {
    fn from(value: RecipeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<MediaError> for RecipeServiceError {
    fn from(value: MediaError) -> Self {
        Self::Media(value)
    }
}

impl From<RepoError> for RecipeServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "recipe",
                id,
            } => Self::RecipeNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Recipe service facade over repository implementations.
pub struct RecipeService<R: RecipeRepository> {
    repo: R,
}

impl<R: RecipeRepository> RecipeService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one recipe owned by `user_id` with nested tags/ingredients.
    pub fn create_recipe(
        &mut self,
        user_id: UserId,
        draft: &RecipeDraft,
    ) -> Result<Recipe, RecipeServiceError> {
        let draft = draft.normalized()?;
        let recipe_id = self.repo.create_recipe(user_id, &draft)?;
        self.repo
            .get_recipe(user_id, recipe_id)?
            .ok_or(RecipeServiceError::InconsistentState(
                "created recipe not found in read-back",
            ))
    }

    /// Applies a partial update and returns the stored result.
    pub fn update_recipe(
        &mut self,
        user_id: UserId,
        recipe_id: RecipeId,
        changes: &RecipeChanges,
    ) -> Result<Recipe, RecipeServiceError> {
        let changes = changes.normalized()?;
        self.repo.update_recipe(user_id, recipe_id, &changes)?;
        self.repo
            .get_recipe(user_id, recipe_id)?
            .ok_or(RecipeServiceError::InconsistentState(
                "updated recipe not found in read-back",
            ))
    }

    /// Gets one of the user's recipes.
    pub fn get_recipe(
        &self,
        user_id: UserId,
        recipe_id: RecipeId,
    ) -> Result<Recipe, RecipeServiceError> {
        self.repo
            .get_recipe(user_id, recipe_id)?
            .ok_or(RecipeServiceError::RecipeNotFound(recipe_id))
    }

    /// Lists the user's recipes, newest first, with optional id filters.
    pub fn list_recipes(&self, query: &RecipeListQuery) -> Result<Vec<Recipe>, RecipeServiceError> {
        Ok(self.repo.list_recipes(query)?)
    }

    /// Deletes one recipe and its stored image.
    pub fn delete_recipe(
        &self,
        user_id: UserId,
        recipe_id: RecipeId,
        media: &MediaStore,
    ) -> Result<(), RecipeServiceError> {
        let recipe = self.get_recipe(user_id, recipe_id)?;
        self.repo.delete_recipe(user_id, recipe_id)?;
        if let Some(image) = recipe.image.as_deref() {
            remove_quietly(media, image);
        }
        Ok(())
    }

    /// Stores an uploaded image and attaches it to the recipe.
    ///
    /// The previous image file, if any, is removed after the new path is
    /// recorded.
    pub fn upload_image(
        &self,
        user_id: UserId,
        recipe_id: RecipeId,
        media: &MediaStore,
        filename: &str,
        bytes: &[u8],
    ) -> Result<Recipe, RecipeServiceError> {
        self.get_recipe(user_id, recipe_id)?;
        if bytes.is_empty() {
            return Err(RecipeValidationError::MissingImage.into());
        }

        let stored = media.save(MediaCategory::Recipe, filename, bytes)?;
        let previous = match self.repo.set_recipe_image(user_id, recipe_id, Some(&stored)) {
            Ok(previous) => previous,
            Err(err) => {
                remove_quietly(media, &stored);
                return Err(err.into());
            }
        };
        if let Some(previous) = previous.as_deref() {
            remove_quietly(media, previous);
        }

        self.get_recipe(user_id, recipe_id)
    }
}

fn remove_quietly(media: &MediaStore, relative: &str) {
    if let Err(err) = media.remove(relative) {
        warn!("event=media_remove module=service status=error error={err}");
    }
}
