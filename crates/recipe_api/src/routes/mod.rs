//! HTTP route handlers grouped by resource.

pub mod attribute;
pub mod banner;
pub mod health;
pub mod recipe;
pub mod user;

use crate::error::ApiError;
use axum::body::Bytes;
use axum::extract::Multipart;

/// One uploaded file taken from a multipart body.
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
}

/// Reads the file part named `field`; other parts are skipped.
pub async fn read_upload(mut multipart: Multipart, field: &'static str) -> Result<Upload, ApiError> {
    while let Some(part) = multipart.next_field().await? {
        if part.name() != Some(field) {
            continue;
        }
        let filename = part.file_name().unwrap_or_default().to_string();
        let bytes = part.bytes().await?;
        if bytes.is_empty() {
            return Err(ApiError::field(field, "The submitted file is empty."));
        }
        return Ok(Upload { filename, bytes });
    }
    Err(ApiError::field(field, "No file was submitted."))
}
