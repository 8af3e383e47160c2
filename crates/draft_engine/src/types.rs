use std::fmt;

use draft_core::{Stage, ValidationError};
use uuid::Uuid;

/// Identifier of one pipeline run, used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionFailure {
    Transport,
    UpstreamStatus(u16),
    MalformedResponse,
    UpstreamBusiness { code: i64 },
    EmptyPayload,
}

impl fmt::Display for ConversionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionFailure::Transport => write!(f, "transport error"),
            ConversionFailure::UpstreamStatus(code) => write!(f, "http status {code}"),
            ConversionFailure::MalformedResponse => write!(f, "malformed response"),
            ConversionFailure::UpstreamBusiness { code } => write!(f, "business error {code}"),
            ConversionFailure::EmptyPayload => write!(f, "empty payload"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ConversionError {
    pub kind: ConversionFailure,
    pub message: String,
}

impl ConversionError {
    pub(crate) fn new(kind: ConversionFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadFailure {
    Transport,
    FetchFailed(u16),
    Storage,
    PlatformRejected { code: Option<i64> },
}

impl fmt::Display for UploadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadFailure::Transport => write!(f, "transport error"),
            UploadFailure::FetchFailed(code) => write!(f, "image fetch returned http status {code}"),
            UploadFailure::Storage => write!(f, "scratch file error"),
            UploadFailure::PlatformRejected { code: Some(code) } => {
                write!(f, "platform rejected upload (errcode {code})")
            }
            UploadFailure::PlatformRejected { code: None } => write!(f, "platform rejected upload"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct UploadError {
    pub kind: UploadFailure,
    pub message: String,
}

impl UploadError {
    pub(crate) fn new(kind: UploadFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishFailure {
    Transport,
    PlatformRejected { code: Option<i64> },
}

impl fmt::Display for PublishFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishFailure::Transport => write!(f, "transport error"),
            PublishFailure::PlatformRejected { code: Some(code) } => {
                write!(f, "platform rejected draft (errcode {code})")
            }
            PublishFailure::PlatformRejected { code: None } => write!(f, "platform rejected draft"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct PublishError {
    pub kind: PublishFailure,
    pub message: String,
}

impl PublishError {
    pub(crate) fn new(kind: PublishFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Terminal failure of a pipeline run: the stage it happened in plus the
/// underlying cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("markdown conversion failed: {0}")]
    Conversion(#[from] ConversionError),
    #[error("cover image upload failed: {0}")]
    CoverUpload(#[from] UploadError),
    #[error("draft creation failed: {0}")]
    Publish(#[from] PublishError),
    #[error("pipeline made no progress after the {stage} step")]
    Stalled { stage: Stage },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Validation(_) => Stage::Validation,
            PipelineError::Conversion(_) => Stage::Conversion,
            PipelineError::CoverUpload(_) => Stage::CoverUpload,
            PipelineError::Publish(_) => Stage::Publish,
            PipelineError::Stalled { stage } => *stage,
        }
    }
}
