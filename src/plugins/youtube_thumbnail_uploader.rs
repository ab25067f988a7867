//! YouTube Data API thumbnail uploader

use crate::core::config::DEFAULT_UPLOAD_BASE_URL;
use crate::core::error::ApiError;
use crate::core::traits::ThumbnailUploader;
use crate::core::video::AccessToken;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::path::Path;
use tokio::fs;

/// Content type sent for a thumbnail file, by extension
pub fn thumbnail_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// `thumbnails.set` client
pub struct YoutubeThumbnailUploader {
    client: reqwest::Client,
    upload_base_url: String,
}

impl Default for YoutubeThumbnailUploader {
    fn default() -> Self {
        Self::new(reqwest::Client::new(), DEFAULT_UPLOAD_BASE_URL)
    }
}

impl YoutubeThumbnailUploader {
    pub fn new(client: reqwest::Client, upload_base_url: impl Into<String>) -> Self {
        Self {
            client,
            upload_base_url: upload_base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ThumbnailUploader for YoutubeThumbnailUploader {
    async fn upload(
        &self,
        token: &AccessToken,
        video_id: &str,
        thumbnail_file_path: &Path,
    ) -> Result<(), ApiError> {
        let image = fs::read(thumbnail_file_path).await.map_err(|source| ApiError::Io {
            path: thumbnail_file_path.to_path_buf(),
            source,
        })?;

        let url = format!("{}/youtube/v3/thumbnails/set", self.upload_base_url);

        tracing::debug!(video_id = %video_id, bytes = image.len(), "uploading thumbnail");

        let response = self
            .client
            .post(&url)
            .query(&[("videoId", video_id)])
            .header(reqwest::header::AUTHORIZATION, token.bearer())
            .header(reqwest::header::CONTENT_TYPE, thumbnail_content_type(thumbnail_file_path))
            .body(image)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => ApiError::BadVideoId {
                video_id: video_id.to_string(),
            },
            StatusCode::FORBIDDEN => ApiError::FeatureNotAvailable { message: body },
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized { message: body },
            _ => ApiError::Http {
                status: status.as_u16(),
                body,
            },
        })
    }
}
