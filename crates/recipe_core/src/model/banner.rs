//! Banner image model.

use chrono::{DateTime, SecondsFormat, Utc};

/// Storage-assigned banner identifier.
pub type BannerId = i64;

/// One uploaded banner image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerImage {
    pub id: BannerId,
    /// Media path relative to the media root.
    pub banner_image: String,
    /// Upload timestamp in epoch milliseconds.
    pub uploaded_at: i64,
}

impl BannerImage {
    /// Upload timestamp as RFC 3339 UTC text.
    pub fn uploaded_at_rfc3339(&self) -> Option<String> {
        DateTime::<Utc>::from_timestamp_millis(self.uploaded_at)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}
