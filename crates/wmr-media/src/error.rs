//! Media error type.

use std::path::PathBuf;
use thiserror::Error;

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0} is not installed or not on PATH")]
    ToolMissing(&'static str),

    #[error("could not start {tool}: {source}")]
    Spawn {
        tool: &'static str,
        source: std::io::Error,
    },

    /// The tool started and exited unsuccessfully.
    #[error("{tool} exited unsuccessfully (code {exit_code:?})")]
    ToolExited {
        tool: &'static str,
        exit_code: Option<i32>,
        stderr: Option<String>,
    },

    #[error("no such file: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("image codec: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

impl MediaError {
    pub fn tool_exited(tool: &'static str, exit_code: Option<i32>, stderr: Option<String>) -> Self {
        Self::ToolExited {
            tool,
            exit_code,
            stderr,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
