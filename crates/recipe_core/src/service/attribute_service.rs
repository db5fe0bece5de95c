//! Tag/ingredient use-case service.
//!
//! # Invariants
//! - Names are trimmed and validated before a rename reaches storage.
//! - Rows owned by other users are reported as not found.

use crate::model::attribute::{normalize_attribute_name, Attribute, AttributeId, AttributeKind};
use crate::model::recipe::RecipeValidationError;
use crate::model::user::UserId;
use crate::repo::attribute_repo::{AttributeListQuery, AttributeRepository};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for tag/ingredient use-cases.
#[derive(Debug)]
pub enum AttributeServiceError {
    Validation(RecipeValidationError),
    NotFound { kind: AttributeKind, id: AttributeId },
    /// The user already has a tag/ingredient with the requested name.
    NameTaken(String),
    Repo(RepoError),
}

impl Display for AttributeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.label()),
            Self::NameTaken(message) => write!(f, "{message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AttributeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecipeValidationError> for AttributeServiceError {
    fn from(value: RecipeValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Tag/ingredient service facade over repository implementations.
pub struct AttributeService<R: AttributeRepository> {
    repo: R,
}

impl<R: AttributeRepository> AttributeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists the user's tags or ingredients by name, descending.
    pub fn list(
        &self,
        kind: AttributeKind,
        user_id: UserId,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, AttributeServiceError> {
        self.repo
            .list_attributes(&AttributeListQuery {
                kind,
                user_id,
                assigned_only,
            })
            .map_err(|err| map_repo_error(kind, err))
    }

    pub fn get(
        &self,
        kind: AttributeKind,
        user_id: UserId,
        id: AttributeId,
    ) -> Result<Attribute, AttributeServiceError> {
        self.repo
            .get_attribute(kind, user_id, id)
            .map_err(|err| map_repo_error(kind, err))?
            .ok_or(AttributeServiceError::NotFound { kind, id })
    }

    /// Renames one of the user's tags/ingredients.
    pub fn rename(
        &self,
        kind: AttributeKind,
        user_id: UserId,
        id: AttributeId,
        name: &str,
    ) -> Result<Attribute, AttributeServiceError> {
        let name = normalize_attribute_name(kind, name)?;
        self.repo
            .rename_attribute(kind, user_id, id, &name)
            .map_err(|err| map_repo_error(kind, err))?;
        self.get(kind, user_id, id)
    }

    /// Deletes one of the user's tags/ingredients and detaches it from recipes.
    pub fn delete(
        &self,
        kind: AttributeKind,
        user_id: UserId,
        id: AttributeId,
    ) -> Result<(), AttributeServiceError> {
        self.repo
            .delete_attribute(kind, user_id, id)
            .map_err(|err| map_repo_error(kind, err))
    }
}

fn map_repo_error(kind: AttributeKind, err: RepoError) -> AttributeServiceError {
    match err {
        RepoError::NotFound { id, .. } => AttributeServiceError::NotFound { kind, id },
        RepoError::Conflict(message) => AttributeServiceError::NameTaken(message),
        other => AttributeServiceError::Repo(other),
    }
}
