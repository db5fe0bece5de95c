//! User account model.
//!
//! # Responsibility
//! - Define the stored account record and creation input.
//! - Normalize and validate email addresses before persistence.
//!
//! # Invariants
//! - Email is never empty and its domain part is lower-case.
//! - `password_hash` always holds a PHC string, never raw password text.

use crate::password::verify_password;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*$").expect("valid email regex")
});

/// Minimum accepted raw password length.
pub const PASSWORD_MIN_CHARS: usize = 5;
/// Maximum stored email / name length.
pub const USER_FIELD_MAX_CHARS: usize = 255;

/// Storage-assigned user identifier.
pub type UserId = i64;

/// Stored account record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl User {
    /// Verifies a raw password against the stored hash.
    pub fn check_password(&self, raw_password: &str) -> bool {
        verify_password(raw_password, &self.password_hash)
    }
}

/// Validated input for inserting one user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Field-level validation failures for user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Email is missing or blank.
    EmptyEmail,
    /// Email does not look like `local@domain`.
    InvalidEmail(String),
    /// Raw password shorter than [`PASSWORD_MIN_CHARS`].
    PasswordTooShort { min: usize },
    /// Field exceeds [`USER_FIELD_MAX_CHARS`].
    TooLong { field: &'static str, max: usize },
}

impl UserValidationError {
    /// Input field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyEmail | Self::InvalidEmail(_) => "email",
            Self::PasswordTooShort { .. } => "password",
            Self::TooLong { field, .. } => field,
        }
    }
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "user must have an email address"),
            Self::InvalidEmail(value) => write!(f, "enter a valid email address, got `{value}`"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must contain at least {min} characters")
            }
            Self::TooLong { field, max } => {
                write!(f, "{field} must contain at most {max} characters")
            }
        }
    }
}

impl Error for UserValidationError {}

/// Normalizes an email address by lower-casing its domain part.
///
/// The local part is case-sensitive and kept verbatim. Values without `@`
/// are only trimmed; [`validate_email`] rejects them afterwards.
pub fn normalize_email(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => trimmed.to_string(),
    }
}

/// Validates an already-normalized email address.
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }
    if email.chars().count() > USER_FIELD_MAX_CHARS {
        return Err(UserValidationError::TooLong {
            field: "email",
            max: USER_FIELD_MAX_CHARS,
        });
    }
    if !EMAIL_RE.is_match(email) {
        return Err(UserValidationError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

/// Validates a raw password before hashing.
pub fn validate_password(raw_password: &str) -> Result<(), UserValidationError> {
    if raw_password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(UserValidationError::PasswordTooShort {
            min: PASSWORD_MIN_CHARS,
        });
    }
    Ok(())
}

/// Validates a display name.
pub fn validate_name(name: &str) -> Result<(), UserValidationError> {
    if name.chars().count() > USER_FIELD_MAX_CHARS {
        return Err(UserValidationError::TooLong {
            field: "name",
            max: USER_FIELD_MAX_CHARS,
        });
    }
    Ok(())
}
