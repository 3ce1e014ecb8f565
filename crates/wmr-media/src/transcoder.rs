//! The transcoding seam used by the pipeline.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::outcome::ToolOutcome;
use wmr_models::EncodingConfig;

/// Operations the pipeline needs from a transcoder.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Native frame rate of `video`; 30 fps when unknown.
    async fn probe_frame_rate(&self, video: &Path) -> f64;

    /// Sample `video` into numbered PNG frames under `out_dir`.
    async fn extract_frames(&self, video: &Path, out_dir: &Path, fps: f64)
        -> ToolOutcome<Vec<PathBuf>>;

    /// Copy the audio track of `video` to `out_path`.
    async fn extract_audio(&self, video: &Path, out_path: &Path) -> ToolOutcome<PathBuf>;

    /// Encode the frame sequence in `frames_dir` into `out_path`.
    async fn assemble(
        &self,
        frames_dir: &Path,
        out_path: &Path,
        fps: f64,
        audio: Option<&Path>,
        encoding: &EncodingConfig,
    ) -> ToolOutcome<PathBuf>;
}

/// [`Transcoder`] backed by the `ffmpeg` and `ffprobe` binaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegTranscoder;

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn probe_frame_rate(&self, video: &Path) -> f64 {
        crate::probe::probe_frame_rate(video).await
    }

    async fn extract_frames(
        &self,
        video: &Path,
        out_dir: &Path,
        fps: f64,
    ) -> ToolOutcome<Vec<PathBuf>> {
        crate::frames::extract_frames(video, out_dir, fps).await
    }

    async fn extract_audio(&self, video: &Path, out_path: &Path) -> ToolOutcome<PathBuf> {
        crate::frames::extract_audio(video, out_path).await
    }

    async fn assemble(
        &self,
        frames_dir: &Path,
        out_path: &Path,
        fps: f64,
        audio: Option<&Path>,
        encoding: &EncodingConfig,
    ) -> ToolOutcome<PathBuf> {
        crate::assemble::assemble_video(frames_dir, out_path, fps, audio, encoding).await
    }
}
