//! State machine for a single publish pipeline run
//!
//! A run only ever moves forward. Terminal states are the two upload aborts,
//! `PartialSuccess` (token lost after a successful upload) and `Done`.

use crate::core::traits::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Pipeline state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    Start,
    Uploading,
    AbortedFatal,
    AbortedAmbiguous,
    Uploaded,
    Exchanging,
    PartialSuccess,
    UpdatingMetadata,
    UpdatingThumbnail,
    Done,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::AbortedFatal | Self::AbortedAmbiguous | Self::PartialSuccess | Self::Done
        )
    }

    /// A video id exists once the run reaches one of these states
    pub fn has_video(&self) -> bool {
        matches!(
            self,
            Self::Uploaded
                | Self::Exchanging
                | Self::PartialSuccess
                | Self::UpdatingMetadata
                | Self::UpdatingThumbnail
                | Self::Done
        )
    }

    pub fn can_transition_to(&self, to: PipelineState) -> bool {
        use PipelineState::*;

        matches!(
            (self, to),
            (Start, Uploading)
                | (Uploading, AbortedFatal | AbortedAmbiguous | Uploaded)
                | (Uploaded, Exchanging | UpdatingMetadata)
                | (Exchanging, PartialSuccess | UpdatingMetadata)
                | (UpdatingMetadata, UpdatingThumbnail)
                | (UpdatingThumbnail, Done)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Uploading => "uploading",
            Self::AbortedFatal => "aborted (fatal)",
            Self::AbortedAmbiguous => "aborted (ambiguous)",
            Self::Uploaded => "uploaded",
            Self::Exchanging => "exchanging token",
            Self::PartialSuccess => "partial success",
            Self::UpdatingMetadata => "updating metadata",
            Self::UpdatingThumbnail => "updating thumbnail",
            Self::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Pipeline stage that can fail
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Upload,
    Token,
    Metadata,
    Thumbnail,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Token => "token",
            Self::Metadata => "metadata",
            Self::Thumbnail => "thumbnail",
        }
    }
}

/// A failed stage, as it was reported to the logger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageFailure {
    pub stage: Stage,
    pub level: LogLevel,
    pub code: String,
    pub message: String,
}

/// State transition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateTransition {
    pub from: PipelineState,
    pub to: PipelineState,
    pub timestamp: DateTime<Utc>,
}

/// Record of one pipeline invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    #[serde(rename = "runId")]
    pub run_id: Uuid,

    #[serde(rename = "currentState")]
    current_state: PipelineState,

    #[serde(rename = "videoId", skip_serializing_if = "Option::is_none")]
    video_id: Option<String>,

    transitions: Vec<StateTransition>,

    failures: Vec<StageFailure>,
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineRun {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            current_state: PipelineState::Start,
            video_id: None,
            transitions: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Move to `to`
    ///
    /// Callers drive the run along the edges of [`PipelineState::can_transition_to`].
    pub(crate) fn advance(&mut self, to: PipelineState) {
        debug_assert!(
            self.current_state.can_transition_to(to),
            "illegal pipeline transition {:?} -> {:?}",
            self.current_state,
            to
        );

        self.transitions.push(StateTransition {
            from: self.current_state,
            to,
            timestamp: Utc::now(),
        });
        self.current_state = to;
    }

    pub(crate) fn uploaded(&mut self, video_id: String) {
        self.video_id = Some(video_id);
        self.advance(PipelineState::Uploaded);
    }

    pub(crate) fn record_failure(&mut self, failure: StageFailure) {
        self.failures.push(failure);
    }

    pub fn state(&self) -> PipelineState {
        self.current_state
    }

    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn failures(&self) -> &[StageFailure] {
        &self.failures
    }

    /// The id returned to callers: present once the upload succeeded
    pub fn outcome(&self) -> Option<String> {
        if self.current_state.has_video() {
            self.video_id.clone()
        } else {
            None
        }
    }

    /// Elapsed milliseconds between the first and last transition
    pub fn elapsed_millis(&self) -> i64 {
        match (self.transitions.first(), self.transitions.last()) {
            (Some(first), Some(last)) => (last.timestamp - first.timestamp).num_milliseconds(),
            _ => 0,
        }
    }

    /// Transition history as human-readable lines
    pub fn history(&self) -> String {
        self.transitions
            .iter()
            .map(|t| format!("{}: {} → {}", t.timestamp.to_rfc3339(), t.from, t.to))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
