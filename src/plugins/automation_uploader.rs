//! Automation Uploader - posts videos through a browser-automation script
//!
//! The script receives one JSON job on stdin:
//!
//! ```json
//! {"login": "...", "password": "...", "channelId": "...", "title": "...",
//!  "description": "...", "category": "education", "categoryId": 27,
//!  "videoFilePath": "/abs/video.mp4"}
//! ```
//!
//! and reports through its last JSON line on stdout, either
//! `{"videoId": "..."}` or `{"error": "<kind>", "message": "..."}` where
//! `<kind>` is one of `configuration`, `account_not_setup_or_quota_exceeded`,
//! `quota_exceeded`, `scraping`, `maybe_already_posted`.

use crate::core::error::UploadError;
use crate::core::traits::Uploader;
use crate::core::video::{UploadCredentials, UploadPayload};
use crate::security::{CommandError, ScriptExecutor, SecretMasker};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Stderr kept in error messages
const MAX_STDERR_CHARS: usize = 2000;

/// Job written to the script's stdin
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadJob<'a> {
    login: &'a str,
    password: &'a str,
    channel_id: &'a str,
    title: &'a str,
    description: &'a str,
    category: &'a str,
    category_id: u32,
    video_file_path: String,
}

/// Report line printed by the script
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScriptReport {
    Posted {
        #[serde(rename = "videoId")]
        video_id: String,
    },
    Failed {
        error: String,
        #[serde(default)]
        message: String,
    },
}

impl ScriptReport {
    fn into_result(self) -> Result<String, UploadError> {
        match self {
            Self::Posted { video_id } if !video_id.is_empty() => Ok(video_id),
            Self::Posted { .. } => Err(UploadError::MaybeAlreadyPosted {
                message: "script reported an empty video id".to_string(),
            }),
            Self::Failed { error, message } => Err(match error.as_str() {
                "configuration" => UploadError::Configuration { message },
                "account_not_setup_or_quota_exceeded" => {
                    UploadError::AccountNotSetupOrQuotaExceeded { message }
                }
                "quota_exceeded" => UploadError::QuotaExceeded { message },
                "scraping" => UploadError::Scraping { message },
                "maybe_already_posted" => UploadError::MaybeAlreadyPosted { message },
                other => UploadError::Unknown {
                    message: format!("{}: {}", other, message),
                },
            }),
        }
    }
}

/// Find the last report line in the script's stdout
pub fn parse_script_output(stdout: &str) -> Option<ScriptReport> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .find_map(|line| serde_json::from_str(line).ok())
}

/// Uploader backed by a browser-automation script
pub struct AutomationUploader {
    executor: ScriptExecutor,
    runtime: String,
    script: PathBuf,
}

impl AutomationUploader {
    pub fn new(executor: ScriptExecutor, runtime: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            executor,
            runtime: runtime.into(),
            script: script.into(),
        }
    }

    fn build_job(
        credentials: &UploadCredentials,
        payload: &UploadPayload,
        video_file_path: &Path,
    ) -> Result<Vec<u8>, UploadError> {
        // The script runs in its own working directory
        let video_file_path = std::path::absolute(video_file_path)
            .unwrap_or_else(|_| video_file_path.to_path_buf());

        let job = UploadJob {
            login: &credentials.login,
            password: credentials.password.expose_secret(),
            channel_id: &credentials.channel_id,
            title: &payload.title,
            description: &payload.description,
            category: payload.category.as_str(),
            category_id: payload.category.id(),
            video_file_path: video_file_path.display().to_string(),
        };

        serde_json::to_vec(&job).map_err(|e| UploadError::Configuration {
            message: format!("failed to encode upload job: {}", e),
        })
    }

    fn classify_command_error(error: CommandError) -> UploadError {
        match error {
            // The browser may have submitted the form before hanging
            CommandError::Timeout(timeout) => UploadError::MaybeAlreadyPosted {
                message: format!("automation script timed out after {:?}", timeout),
            },
            other => UploadError::Configuration {
                message: other.to_string(),
            },
        }
    }
}

#[async_trait]
impl Uploader for AutomationUploader {
    async fn upload(
        &self,
        credentials: &UploadCredentials,
        payload: &UploadPayload,
        video_file_path: &Path,
    ) -> Result<String, UploadError> {
        if !video_file_path.is_file() {
            return Err(UploadError::Configuration {
                message: format!("video file not found: {}", video_file_path.display()),
            });
        }

        let job = Self::build_job(credentials, payload, video_file_path)?;
        let script = self.script.display().to_string();

        tracing::info!(
            runtime = %self.runtime,
            script = %script,
            channel_id = %credentials.channel_id,
            "running automation upload"
        );

        let output = self
            .executor
            .execute(&self.runtime, &[script.as_str()], &job)
            .await
            .map_err(Self::classify_command_error)?;

        let masker = SecretMasker::new([credentials.password.expose_secret()]);
        let stdout = String::from_utf8_lossy(&output.stdout);

        match parse_script_output(&stdout) {
            Some(report) => {
                let result = report.into_result().map_err(|e| mask_error(e, &masker));
                if let Ok(video_id) = &result {
                    tracing::info!(video_id = %video_id, "automation upload finished");
                }
                result
            }
            None => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stderr: String = masker.mask(stderr.trim()).chars().take(MAX_STDERR_CHARS).collect();
                tracing::debug!(status = ?output.status, "automation script printed no report");

                Err(UploadError::Unknown {
                    message: format!(
                        "automation script exited with {} without a report: {}",
                        output.status, stderr
                    ),
                })
            }
        }
    }
}

fn mask_error(error: UploadError, masker: &SecretMasker) -> UploadError {
    match error {
        UploadError::Configuration { message } => UploadError::Configuration {
            message: masker.mask(&message),
        },
        UploadError::AccountNotSetupOrQuotaExceeded { message } => {
            UploadError::AccountNotSetupOrQuotaExceeded {
                message: masker.mask(&message),
            }
        }
        UploadError::QuotaExceeded { message } => UploadError::QuotaExceeded {
            message: masker.mask(&message),
        },
        UploadError::Scraping { message } => UploadError::Scraping {
            message: masker.mask(&message),
        },
        UploadError::MaybeAlreadyPosted { message } => UploadError::MaybeAlreadyPosted {
            message: masker.mask(&message),
        },
        UploadError::Unknown { message } => UploadError::Unknown {
            message: masker.mask(&message),
        },
    }
}
