//! Collaborator contracts consumed by the publish pipeline
//!
//! The orchestrator only depends on these traits. Concrete implementations
//! live in [`crate::plugins`] and [`crate::logging`].

use crate::core::error::{ApiError, TokenError, UploadError};
use crate::core::video::{AccessToken, ClientCredentials, UploadCredentials, UploadPayload, VideoMetadata};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

// ============================================================================
// Logging
// ============================================================================

/// Severity of a log emission
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Emergency => write!(f, "emergency"),
            LogLevel::Alert => write!(f, "alert"),
            LogLevel::Critical => write!(f, "critical"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Notice => write!(f, "notice"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
        }
    }
}

/// Structured data attached to a log emission
pub type LogContext = HashMap<String, serde_json::Value>;

/// Leveled diagnostic sink
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str, context: &LogContext);

    fn emergency(&self, message: &str, context: &LogContext) {
        self.log(LogLevel::Emergency, message, context);
    }

    fn error(&self, message: &str, context: &LogContext) {
        self.log(LogLevel::Error, message, context);
    }
}

// ============================================================================
// Collaborators
// ============================================================================

/// Publishes a video through browser automation
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload `video_file_path` with the sanitized `payload`
    ///
    /// Returns the platform-assigned video id.
    async fn upload(
        &self,
        credentials: &UploadCredentials,
        payload: &UploadPayload,
        video_file_path: &Path,
    ) -> Result<String, UploadError>;
}

/// Exchanges long-lived client credentials for a short-lived access token
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn exchange(&self, client: &ClientCredentials) -> Result<AccessToken, TokenError>;
}

/// Overwrites a video's metadata through the Data API
#[async_trait]
pub trait MetadataUpdater: Send + Sync {
    async fn update(
        &self,
        token: &AccessToken,
        video_id: &str,
        metadata: &VideoMetadata,
        tags: &[String],
        made_for_kids: bool,
    ) -> Result<(), ApiError>;
}

/// Sets a video's custom thumbnail through the Data API
#[async_trait]
pub trait ThumbnailUploader: Send + Sync {
    async fn upload(
        &self,
        token: &AccessToken,
        video_id: &str,
        thumbnail_file_path: &Path,
    ) -> Result<(), ApiError>;
}
