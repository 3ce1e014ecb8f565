//! Pipeline error types.

use thiserror::Error;

use wmr_media::MediaError;
use wmr_models::{JobState, RegionError};

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Invalid watermark region: {0}")]
    InvalidRegion(#[from] RegionError),

    #[error("No frames could be extracted from the video")]
    NoFrames,

    #[error("Assembly failed: {0}")]
    AssemblyFailed(String),

    #[error("Illegal job transition from {from} to {to}")]
    InvalidTransition { from: JobState, to: JobState },

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn assembly_failed(msg: impl Into<String>) -> Self {
        Self::AssemblyFailed(msg.into())
    }

    /// Whether the caller's input is at fault rather than the server.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidRegion(_) | PipelineError::NoFrames
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PipelineError::VideoNotFound(_))
    }

    /// Short, stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::VideoNotFound(_) => "video_not_found",
            PipelineError::InvalidRegion(_) => "invalid_region",
            PipelineError::NoFrames => "no_frames",
            PipelineError::AssemblyFailed(_) => "assembly_failed",
            PipelineError::InvalidTransition { .. } => "invalid_transition",
            PipelineError::Media(_) => "media",
            PipelineError::Io(_) => "io",
        }
    }
}
