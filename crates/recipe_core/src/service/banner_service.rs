//! Banner image use-case service.

use crate::media::{MediaCategory, MediaError, MediaStore};
use crate::model::banner::{BannerId, BannerImage};
use crate::repo::banner_repo::BannerRepository;
use crate::repo::RepoError;
use chrono::Utc;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum BannerServiceError {
    Media(MediaError),
    NotFound(BannerId),
    Repo(RepoError),
}

impl Display for BannerServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Media(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "banner image not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BannerServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Media(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<MediaError> for BannerServiceError {
    fn from(value: MediaError) -> Self {
        Self::Media(value)
    }
}

impl From<RepoError> for BannerServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub struct BannerService<R: BannerRepository> {
    repo: R,
}

impl<R: BannerRepository> BannerService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores the uploaded file and records it with the current time.
    pub fn upload(
        &self,
        media: &MediaStore,
        filename: &str,
        bytes: &[u8],
    ) -> Result<BannerImage, BannerServiceError> {
        let stored = media.save(MediaCategory::Banner, filename, bytes)?;
        match self
            .repo
            .create_banner(&stored, Utc::now().timestamp_millis())
        {
            Ok(banner) => {
                info!(
                    "event=banner_upload module=service status=ok banner_id={}",
                    banner.id
                );
                Ok(banner)
            }
            Err(err) => {
                if let Err(remove_err) = media.remove(&stored) {
                    warn!("event=media_remove module=service status=error error={remove_err}");
                }
                Err(err.into())
            }
        }
    }

    pub fn list(&self) -> Result<Vec<BannerImage>, BannerServiceError> {
        Ok(self.repo.list_banners()?)
    }

    pub fn get(&self, id: BannerId) -> Result<BannerImage, BannerServiceError> {
        self.repo
            .get_banner(id)?
            .ok_or(BannerServiceError::NotFound(id))
    }
}
