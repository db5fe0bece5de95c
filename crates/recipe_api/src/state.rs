//! Shared request state.

use crate::error::ApiError;
use axum::http::HeaderValue;
use recipe_core::{media_url, MediaStore};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    pub media: MediaStore,
    pub media_url: String,
    pub public_url: Option<String>,
    /// Empty allows any origin.
    pub cors_origins: Vec<HeaderValue>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(conn: Connection, media: MediaStore, media_url: impl Into<String>) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            media,
            media_url: media_url.into(),
            public_url: None,
            cors_origins: Vec::new(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn with_public_url(mut self, public_url: Option<String>) -> Self {
        self.public_url = public_url;
        self
    }

    pub fn with_cors_origins(mut self, cors_origins: Vec<HeaderValue>) -> Self {
        self.cors_origins = cors_origins;
        self
    }

    /// Runs storage work on the blocking pool with the connection locked.
    pub async fn with_db<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, ApiError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|_| ApiError::Internal("database lock poisoned".to_string()))?;
            work(&mut *conn)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("storage task failed: {err}")))?
    }

    /// Public URL of a stored media path, prefixed with the public origin
    /// when one is configured.
    pub fn url_for(&self, relative: &str) -> String {
        let path = media_url(&self.media_url, relative);
        match &self.public_url {
            Some(origin) => format!("{origin}{path}"),
            None => path,
        }
    }
}
