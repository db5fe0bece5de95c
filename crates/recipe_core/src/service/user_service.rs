//! Account use-case service.
//!
//! # Responsibility
//! - Create regular and super users with normalized emails and hashed
//!   passwords.
//! - Authenticate credentials and hand out API tokens.
//! - Apply partial profile updates.
//!
//! # Invariants
//! - An empty email is rejected before any storage access.
//! - Superusers always have both `is_staff` and `is_superuser` set.
//! - Log events never carry emails, passwords or tokens.

use crate::model::user::{
    normalize_email, validate_email, validate_name, validate_password, NewUser, User, UserId,
    UserValidationError,
};
use crate::password::{hash_password, PasswordError};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for account use-cases.
#[derive(Debug)]
pub enum UserServiceError {
    Validation(UserValidationError),
    /// Unknown email, wrong password or inactive account.
    InvalidCredentials,
    /// Another account already uses the email.
    EmailTaken,
    UserNotFound(UserId),
    Password(PasswordError),
    Repo(RepoError),
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidCredentials => {
                write!(f, "unable to authenticate with provided credentials")
            }
            Self::EmailTaken => write!(f, "user with this email already exists"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Password(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Password(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UserValidationError> for UserServiceError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PasswordError> for UserServiceError {
    fn from(value: PasswordError) -> Self {
        Self::Password(value)
    }
}

impl From<RepoError> for UserServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Conflict(_) => Self::EmailTaken,
            RepoError::NotFound { id, .. } => Self::UserNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Partial profile update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Account service facade over repository implementations.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a regular user.
    ///
    /// # Errors
    /// - `Validation(EmptyEmail)` when `email` is empty or blank.
    /// - `Validation(InvalidEmail)` when `email` is malformed.
    /// - `EmailTaken` when the normalized email already exists.
    pub fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, UserServiceError> {
        self.insert(email, password, name, false)
    }

    /// Creates a user with staff and superuser flags set.
    pub fn create_superuser(&self, email: &str, password: &str) -> Result<User, UserServiceError> {
        self.insert(email, password, "", true)
    }

    /// Gets one user by id.
    pub fn get_user(&self, id: UserId) -> Result<User, UserServiceError> {
        self.repo
            .get_user(id)?
            .ok_or(UserServiceError::UserNotFound(id))
    }

    /// Checks credentials and returns the matching active user.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User, UserServiceError> {
        let email = normalize_email(email);
        let Some(user) = self.repo.find_by_email(&email)? else {
            warn!("event=user_authenticate module=service status=error reason=unknown_email");
            return Err(UserServiceError::InvalidCredentials);
        };
        if !user.is_active || !user.check_password(password) {
            warn!(
                "event=user_authenticate module=service status=error reason=rejected user_id={}",
                user.id
            );
            return Err(UserServiceError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Authenticates and returns the user's API token.
    pub fn issue_token(&self, email: &str, password: &str) -> Result<String, UserServiceError> {
        let user = self.authenticate(email, password)?;
        let token = self.repo.get_or_create_token(user.id)?;
        info!(
            "event=token_issue module=service status=ok user_id={}",
            user.id
        );
        Ok(token)
    }

    /// Resolves the active user owning a token.
    pub fn user_for_token(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self.repo.user_for_token(token)?)
    }

    /// Applies a partial profile update and returns the stored result.
    pub fn update_user(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<User, UserServiceError> {
        let mut user = self.get_user(id)?;

        if let Some(email) = &changes.email {
            let email = normalize_email(email);
            validate_email(&email)?;
            user.email = email;
        }
        if let Some(name) = &changes.name {
            let name = name.trim();
            validate_name(name)?;
            user.name = name.to_string();
        }
        if let Some(password) = &changes.password {
            validate_password(password)?;
            user.password_hash = hash_password(password)?;
        }

        self.repo.update_user(&user)?;
        info!(
            "event=user_update module=service status=ok user_id={} password_changed={}",
            id,
            changes.password.is_some()
        );
        self.get_user(id)
    }

    fn insert(
        &self,
        email: &str,
        password: &str,
        name: &str,
        superuser: bool,
    ) -> Result<User, UserServiceError> {
        let email = normalize_email(email);
        validate_email(&email)?;
        let name = name.trim();
        validate_name(name)?;

        let new_user = NewUser {
            email,
            name: name.to_string(),
            password_hash: hash_password(password)?,
            is_staff: superuser,
            is_superuser: superuser,
        };
        let user = self.repo.create_user(&new_user)?;
        info!(
            "event=user_create module=service status=ok user_id={} is_superuser={}",
            user.id, user.is_superuser
        );
        Ok(user)
    }
}
