//! Video Publisher - Orchestrates the publish pipeline
//!
//! Manages the complete publishing workflow:
//! - Upload through browser automation with sanitized metadata
//! - Access token exchange (credential-exchange entry only)
//! - Metadata restore through the Data API
//! - Thumbnail upload through the Data API
//!
//! Only the upload stage can abort a run. Every failure is reported to the
//! [`Logger`] exactly once and never returned to the caller; the returned
//! video id (or its absence) is the only outcome signal.
//!
//! Publishing is not idempotent: two calls with the same request upload the
//! video twice.

use crate::core::error::UploadError;
use crate::core::state_machine::{PipelineRun, PipelineState, Stage, StageFailure};
use crate::core::traits::{
    LogContext, LogLevel, Logger, MetadataUpdater, ThumbnailUploader, TokenSource, Uploader,
};
use crate::core::video::{
    AccessToken, ClientCredentials, DEFAULT_PLACEHOLDER_DESCRIPTION, PublishOutcome, PublishRequest,
    UploadCredentials, UploadPayload,
};
use serde_json::json;
use std::borrow::Cow;
use std::error::Error;
use std::sync::Arc;

/// Where the access token for the enrichment stages comes from
enum TokenSupply<'a> {
    /// Obtained by the caller
    Given(&'a AccessToken),
    /// Exchanged after a successful upload
    Exchange(&'a ClientCredentials),
}

/// Main video publisher orchestrator
///
/// Holds collaborator handles only; every call works on its own request, so
/// a publisher can be shared across tasks.
#[derive(Clone)]
pub struct VideoPublisher {
    logger: Arc<dyn Logger>,
    uploader: Arc<dyn Uploader>,
    token_source: Arc<dyn TokenSource>,
    video_updater: Arc<dyn MetadataUpdater>,
    thumbnail_uploader: Arc<dyn ThumbnailUploader>,
    placeholder_description: String,
}

impl VideoPublisher {
    pub fn new(
        logger: Arc<dyn Logger>,
        uploader: Arc<dyn Uploader>,
        token_source: Arc<dyn TokenSource>,
        video_updater: Arc<dyn MetadataUpdater>,
        thumbnail_uploader: Arc<dyn ThumbnailUploader>,
    ) -> Self {
        Self {
            logger,
            uploader,
            token_source,
            video_updater,
            thumbnail_uploader,
            placeholder_description: DEFAULT_PLACEHOLDER_DESCRIPTION.to_string(),
        }
    }

    /// Replace the description sent to the automation uploader
    pub fn with_placeholder_description(mut self, placeholder_description: impl Into<String>) -> Self {
        self.placeholder_description = placeholder_description.into();
        self
    }

    /// Publish, exchanging `client` for an access token after the upload
    pub async fn publish_via_credential_exchange(
        &self,
        credentials: &UploadCredentials,
        request: &PublishRequest,
        client: &ClientCredentials,
    ) -> PublishOutcome {
        self.run_via_credential_exchange(credentials, request, client)
            .await
            .outcome()
    }

    /// Publish with an access token obtained by the caller
    pub async fn publish_via_token(
        &self,
        credentials: &UploadCredentials,
        request: &PublishRequest,
        token: &AccessToken,
    ) -> PublishOutcome {
        self.run_via_token(credentials, request, token).await.outcome()
    }

    /// Same as [`publish_via_credential_exchange`](Self::publish_via_credential_exchange),
    /// returning the full run record
    pub async fn run_via_credential_exchange(
        &self,
        credentials: &UploadCredentials,
        request: &PublishRequest,
        client: &ClientCredentials,
    ) -> PipelineRun {
        self.run(credentials, request, TokenSupply::Exchange(client)).await
    }

    /// Same as [`publish_via_token`](Self::publish_via_token), returning the
    /// full run record
    pub async fn run_via_token(
        &self,
        credentials: &UploadCredentials,
        request: &PublishRequest,
        token: &AccessToken,
    ) -> PipelineRun {
        self.run(credentials, request, TokenSupply::Given(token)).await
    }

    async fn run(
        &self,
        credentials: &UploadCredentials,
        request: &PublishRequest,
        supply: TokenSupply<'_>,
    ) -> PipelineRun {
        let mut run = PipelineRun::new();

        let Some(video_id) = self.upload(&mut run, credentials, request).await else {
            return run;
        };

        let token = match supply {
            TokenSupply::Given(token) => Cow::Borrowed(token),
            TokenSupply::Exchange(client) => {
                run.advance(PipelineState::Exchanging);

                match self.token_source.exchange(client).await {
                    Ok(token) => Cow::Owned(token),
                    Err(e) => {
                        // The upload stands; only the enrichment stages are lost
                        self.report(&mut run, Stage::Token, LogLevel::Error, e.code(), &e, LogContext::new());
                        run.advance(PipelineState::PartialSuccess);
                        return run;
                    }
                }
            }
        };

        self.enrich(&mut run, &token, &video_id, request).await;
        run
    }

    /// Upload stage. `None` means the run was aborted.
    async fn upload(
        &self,
        run: &mut PipelineRun,
        credentials: &UploadCredentials,
        request: &PublishRequest,
    ) -> Option<String> {
        run.advance(PipelineState::Uploading);

        let payload = UploadPayload::sanitized(&request.metadata, &self.placeholder_description);

        match self
            .uploader
            .upload(credentials, &payload, &request.video_file_path)
            .await
        {
            Ok(video_id) => {
                run.uploaded(video_id.clone());
                Some(video_id)
            }
            Err(e) => {
                let aborted = if e.is_ambiguous() {
                    PipelineState::AbortedAmbiguous
                } else {
                    PipelineState::AbortedFatal
                };
                let context = Self::upload_context(&e, credentials, request);
                self.report(run, Stage::Upload, e.level(), e.code(), &e, context);
                run.advance(aborted);
                None
            }
        }
    }

    /// Metadata and thumbnail stages; neither can abort the run
    async fn enrich(
        &self,
        run: &mut PipelineRun,
        token: &AccessToken,
        video_id: &str,
        request: &PublishRequest,
    ) {
        run.advance(PipelineState::UpdatingMetadata);

        if let Err(e) = self
            .video_updater
            .update(
                token,
                video_id,
                &request.metadata,
                &request.tags,
                request.made_for_kids,
            )
            .await
        {
            self.report(run, Stage::Metadata, LogLevel::Error, e.code(), &e, LogContext::new());
        }

        run.advance(PipelineState::UpdatingThumbnail);

        // No thumbnail requested: the stage completes without a call
        let Some(thumbnail_file_path) = request.thumbnail_file_path() else {
            run.advance(PipelineState::Done);
            return;
        };

        if let Err(e) = self
            .thumbnail_uploader
            .upload(token, video_id, thumbnail_file_path)
            .await
        {
            let mut context = LogContext::new();
            context.insert(
                "thumbnail_file_path".to_string(),
                json!(thumbnail_file_path.display().to_string()),
            );
            self.report(run, Stage::Thumbnail, LogLevel::Error, e.code(), &e, context);
        }

        run.advance(PipelineState::Done);
    }

    fn upload_context(
        error: &UploadError,
        credentials: &UploadCredentials,
        request: &PublishRequest,
    ) -> LogContext {
        let mut context = LogContext::new();
        context.insert("login".to_string(), json!(credentials.login));
        context.insert("channel_id".to_string(), json!(credentials.channel_id));
        context.insert(
            "video_file_path".to_string(),
            json!(request.video_file_path.display().to_string()),
        );
        context.insert("suggested_actions".to_string(), json!(error.suggested_actions()));
        context
    }

    /// Emit exactly one log entry for a failed stage and record it on the run
    fn report(
        &self,
        run: &mut PipelineRun,
        stage: Stage,
        level: LogLevel,
        code: &str,
        error: &(dyn Error + 'static),
        mut context: LogContext,
    ) {
        context.insert("run_id".to_string(), json!(run.run_id.to_string()));
        context.insert("stage".to_string(), json!(stage.as_str()));
        context.insert("code".to_string(), json!(code));
        if let Some(video_id) = run.video_id() {
            context.insert("video_id".to_string(), json!(video_id));
        }

        let causes = error_chain(error);
        if !causes.is_empty() {
            context.insert("causes".to_string(), json!(causes));
        }

        let message = error.to_string();
        self.logger.log(level, &message, &context);

        run.record_failure(StageFailure {
            stage,
            level,
            code: code.to_string(),
            message,
        });
    }
}

/// Messages of every `source()` below `error`
fn error_chain(error: &(dyn Error + 'static)) -> Vec<String> {
    let mut causes = Vec::new();
    let mut current = error.source();
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    causes
}
