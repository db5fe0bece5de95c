//! HTTP error mapping.
//!
//! Validation failures become `400` with a `{"<field>": ["<message>"]}` body
//! (or `{"detail": ...}` when no field applies), missing or bad tokens `401`,
//! unknown or foreign rows `404`. Multipart failures keep the status axum
//! assigns them, so an oversized upload is `413`. Everything else is logged
//! and reported as a bare `500`.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use recipe_core::{
    AttributeServiceError, BannerServiceError, MediaError, RecipeServiceError,
    UserServiceError,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Field {
        field: &'static str,
        message: String,
    },

    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,

    #[error("Invalid token.")]
    InvalidToken,

    #[error("Not found.")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self::Field {
            field,
            message: message.into(),
        }
    }

    /// Maps a media failure onto the upload field that carried the file.
    pub fn from_media(field: &'static str, err: MediaError) -> Self {
        match err {
            MediaError::EmptyFile | MediaError::UnsupportedExtension(_) => {
                Self::field(field, err.to_string())
            }
            other => Self::Internal(other.to_string()),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Field { .. } | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Rejected { status, .. } => *status,
            Self::NotAuthenticated | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Field { field, message } => json!({ (*field): [message] }),
            Self::Internal(details) => {
                error!("event=request_failed module=api status=error error={details}");
                json!({ "detail": "Internal server error." })
            }
            other => json!({ "detail": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<UserServiceError> for ApiError {
    fn from(value: UserServiceError) -> Self {
        let message = value.to_string();
        match value {
            UserServiceError::Validation(err) => Self::field(err.field(), message),
            UserServiceError::InvalidCredentials => Self::field("non_field_errors", message),
            UserServiceError::EmailTaken => Self::field("email", message),
            UserServiceError::UserNotFound(_) => Self::NotFound,
            _ => Self::Internal(message),
        }
    }
}

impl From<RecipeServiceError> for ApiError {
    fn from(value: RecipeServiceError) -> Self {
        match value {
            RecipeServiceError::Validation(err) => Self::field(err.field(), err.to_string()),
            RecipeServiceError::RecipeNotFound(_) => Self::NotFound,
            RecipeServiceError::Media(err) => Self::from_media("image", err),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<AttributeServiceError> for ApiError {
    fn from(value: AttributeServiceError) -> Self {
        match value {
            AttributeServiceError::Validation(err) => Self::field("name", err.to_string()),
            AttributeServiceError::NameTaken(message) => Self::field("name", message),
            AttributeServiceError::NotFound { .. } => Self::NotFound,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<BannerServiceError> for ApiError {
    fn from(value: BannerServiceError) -> Self {
        match value {
            BannerServiceError::Media(err) => Self::from_media("banner_image", err),
            BannerServiceError::NotFound(_) => Self::NotFound,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<recipe_core::RepoError> for ApiError {
    fn from(value: recipe_core::RepoError) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        Self::NotFound
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(value: MultipartRejection) -> Self {
        Self::Rejected {
            status: value.status(),
            message: value.body_text(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(value: MultipartError) -> Self {
        Self::Rejected {
            status: value.status(),
            message: value.body_text(),
        }
    }
}
