//! The image service
//!
//! Uploads go to a separate base URL from the rest of the API and come back
//! wrapped in a `payload` envelope instead of `response`.

use crate::error::{Error, Result};
use crate::http::Session;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// URLs for an uploaded image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedImage {
    /// Canonical image URL, usable in attachments and avatars
    pub url: String,
    /// Preview-sized variant
    #[serde(default)]
    pub picture_url: Option<String>,
}

/// The image service manager
#[derive(Debug, Clone, Copy)]
pub struct Images<'a> {
    session: &'a Session,
}

impl<'a> Images<'a> {
    pub(crate) fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Upload image data and get back its service URLs
    pub async fn upload(&self, data: Bytes) -> Result<UploadedImage> {
        let url = self.session.image_url("pictures");
        let response = self.session.upload(&url, "file", data).await?;
        let payload = response.data()?;
        serde_json::from_value(payload).map_err(Error::from)
    }

    /// Download raw image bytes from a service URL
    pub async fn download(&self, url: &str) -> Result<Bytes> {
        self.session.download(url).await
    }
}
