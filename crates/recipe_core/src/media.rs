//! On-disk media storage for uploaded images.
//!
//! # Responsibility
//! - Write uploaded bytes below a configured media root.
//! - Generate collision-free relative paths (`uploads/<category>/<uuid>.<ext>`).
//!
//! # Invariants
//! - Stored paths are always relative and never escape the media root.
//! - Only image file extensions are accepted.

use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

/// Upload category, which decides the storage sub-directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCategory {
    Recipe,
    Banner,
}

impl MediaCategory {
    fn dir(self) -> &'static str {
        match self {
            Self::Recipe => "uploads/recipe",
            Self::Banner => "uploads/banner",
        }
    }
}

#[derive(Debug)]
pub enum MediaError {
    /// Upload body is empty.
    EmptyFile,
    /// Filename has no extension or a non-image one.
    UnsupportedExtension(String),
    /// Stored path is absolute or contains `..`.
    InvalidPath(String),
    Io(std::io::Error),
}

impl Display for MediaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFile => write!(f, "the submitted file is empty"),
            Self::UnsupportedExtension(name) => write!(
                f,
                "upload a valid image; `{name}` is not one of {}",
                ALLOWED_EXTENSIONS.join(", ")
            ),
            Self::InvalidPath(path) => write!(f, "invalid media path `{path}`"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MediaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MediaError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Filesystem media store rooted at one directory.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stores bytes and returns the generated relative path.
    pub fn save(
        &self,
        category: MediaCategory,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<String, MediaError> {
        if bytes.is_empty() {
            return Err(MediaError::EmptyFile);
        }
        let relative = generate_media_path(category, original_filename)?;
        let absolute = self.root.join(&relative);
        if let Some(parent) = absolute.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&absolute, bytes)?;
        info!(
            "event=media_save module=media status=ok category={} bytes={}",
            category.dir(),
            bytes.len()
        );
        Ok(relative)
    }

    /// Removes a previously stored file; missing files are ignored.
    pub fn remove(&self, relative: &str) -> Result<(), MediaError> {
        let absolute = self.resolve(relative)?;
        match std::fs::remove_file(&absolute) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!("event=media_remove module=media status=skip reason=missing_file");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Resolves a stored relative path to its absolute location.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, MediaError> {
        let path = Path::new(relative);
        let is_safe = path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if relative.is_empty() || !is_safe {
            return Err(MediaError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(path))
    }
}

/// Builds `uploads/<category>/<uuid>.<ext>` for an uploaded filename.
pub fn generate_media_path(
    category: MediaCategory,
    original_filename: &str,
) -> Result<String, MediaError> {
    let extension = Path::new(original_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| MediaError::UnsupportedExtension(original_filename.to_string()))?;
    Ok(format!("{}/{}.{extension}", category.dir(), Uuid::new_v4()))
}

/// Joins a media base URL and a stored relative path.
pub fn media_url(base_url: &str, relative: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        relative.trim_start_matches('/')
    )
}
