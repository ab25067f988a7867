//! Error handling for video publishing
//!
//! Each collaborator family has its own error type so the orchestrator can
//! classify failures by matching on variants instead of inspecting messages.

use crate::core::traits::LogLevel;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Upload stage
// ============================================================================

/// Failure reported by the automation uploader
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("automation account is misconfigured: {message}")]
    Configuration { message: String },

    #[error("account is not set up or its upload quota is exceeded: {message}")]
    AccountNotSetupOrQuotaExceeded { message: String },

    #[error("upload quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("scraping failed before the video was submitted: {message}")]
    Scraping { message: String },

    #[error("video may already be posted but its id could not be scraped: {message}")]
    MaybeAlreadyPosted { message: String },

    #[error("unknown automation failure: {message}")]
    Unknown { message: String },
}

impl UploadError {
    /// The platform may have accepted the video despite the failure
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::MaybeAlreadyPosted { .. })
    }

    /// Severity the orchestrator logs this failure at
    pub fn level(&self) -> LogLevel {
        if self.is_ambiguous() {
            LogLevel::Error
        } else {
            LogLevel::Emergency
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "UPLOAD_CONFIGURATION",
            Self::AccountNotSetupOrQuotaExceeded { .. } => "UPLOAD_ACCOUNT_NOT_SETUP_OR_QUOTA_EXCEEDED",
            Self::QuotaExceeded { .. } => "UPLOAD_QUOTA_EXCEEDED",
            Self::Scraping { .. } => "UPLOAD_SCRAPING",
            Self::MaybeAlreadyPosted { .. } => "UPLOAD_MAYBE_ALREADY_POSTED",
            Self::Unknown { .. } => "UPLOAD_UNKNOWN",
        }
    }

    /// Operator guidance attached to the log context
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::Configuration { .. } => vec![
                "Check the automation login and password",
                "Check that the channel id is linked to the automation account",
            ],
            Self::AccountNotSetupOrQuotaExceeded { .. } => vec![
                "Finish the automation account setup",
                "Check the remaining upload quota",
            ],
            Self::QuotaExceeded { .. } => vec!["Wait for the upload quota to reset"],
            Self::Scraping { .. } => vec![
                "The automation site layout may have changed",
                "Update the automation script",
            ],
            Self::MaybeAlreadyPosted { .. } => vec![
                "Check the channel for a duplicate upload before retrying",
            ],
            Self::Unknown { .. } => vec![
                "Inspect the automation script output",
                "Run the script manually to reproduce",
            ],
        }
    }
}

// ============================================================================
// Token stage
// ============================================================================

/// Failure exchanging client credentials for an access token
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token exchange rejected ({error}): {description}")]
    Auth { error: String, description: String },

    #[error("token endpoint returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed token response: {0}")]
    MalformedResponse(String),

    #[error("token request failed")]
    Transport(#[from] reqwest::Error),
}

impl TokenError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "TOKEN_AUTH",
            Self::Http { .. } => "TOKEN_HTTP",
            Self::MalformedResponse(_) => "TOKEN_MALFORMED_RESPONSE",
            Self::Transport(_) => "TOKEN_TRANSPORT",
        }
    }
}

// ============================================================================
// Metadata and thumbnail stages
// ============================================================================

/// Failure calling the Data API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("video {video_id} was not found")]
    BadVideoId { video_id: String },

    #[error("custom thumbnails are not available for this channel: {message}")]
    FeatureNotAvailable { message: String },

    #[error("access token was rejected: {message}")]
    Unauthorized { message: String },

    #[error("API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("API request failed")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadVideoId { .. } => "API_BAD_VIDEO_ID",
            Self::FeatureNotAvailable { .. } => "API_FEATURE_NOT_AVAILABLE",
            Self::Unauthorized { .. } => "API_UNAUTHORIZED",
            Self::Http { .. } => "API_HTTP",
            Self::Io { .. } => "API_IO",
            Self::Transport(_) => "API_TRANSPORT",
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Failure loading the publisher configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("missing configuration value: {0}")]
    Missing(&'static str),

    #[error("invalid configuration value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}
