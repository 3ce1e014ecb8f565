//! Frame sampling and audio extraction.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};

use crate::command::{format_rate, FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::outcome::ToolOutcome;
use crate::probe::has_audio_stream;
use wmr_models::encoding::{is_frame_file_name, FRAME_PATTERN, FRAME_QUALITY};

/// Sample `video` into `out_dir/frame_%05d.png` at `fps` frames per second.
///
/// Frames come back in index order. A non-zero exit or an empty directory is
/// reported as [`ToolOutcome::Empty`].
pub async fn extract_frames(
    video: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    fps: f64,
) -> ToolOutcome<Vec<PathBuf>> {
    let video = video.as_ref();
    let out_dir = out_dir.as_ref();

    if let Err(e) = fs::create_dir_all(out_dir).await {
        return ToolOutcome::Failed(e.into());
    }

    let cmd = FfmpegCommand::new(video, out_dir.join(FRAME_PATTERN))
        .video_filter(format!("fps={}", format_rate(fps)))
        .quality(FRAME_QUALITY);

    let run = FfmpegRunner::new().run(&cmd).await;
    let frames = if run.is_ok() {
        match list_frames(out_dir).await {
            Ok(frames) => frames,
            Err(e) => return ToolOutcome::Failed(e),
        }
    } else {
        Vec::new()
    };

    let outcome = ToolOutcome::from_run(run, || (!frames.is_empty()).then_some(frames));
    match &outcome {
        ToolOutcome::Produced(frames) => {
            info!(video = %video.display(), count = frames.len(), "Extracted frames");
        }
        other => {
            warn!(video = %video.display(), "Frame extraction {}", other);
        }
    }
    outcome
}

/// Copy the audio stream of `video` into `out_path`.
///
/// A video without audio is not an error: the result is
/// [`ToolOutcome::Empty`] and `out_path` is left absent.
pub async fn extract_audio(
    video: impl AsRef<Path>,
    out_path: impl AsRef<Path>,
) -> ToolOutcome<PathBuf> {
    let video = video.as_ref();
    let out_path = out_path.as_ref();

    match has_audio_stream(video).await {
        Ok(true) => {}
        Ok(false) => {
            debug!(video = %video.display(), "No audio stream, skipping audio extraction");
            return ToolOutcome::skipped();
        }
        Err(e) => return ToolOutcome::Failed(e),
    }

    let cmd = FfmpegCommand::new(video, out_path)
        .no_video()
        .audio_codec("copy");

    let run = FfmpegRunner::new().run(&cmd).await;
    let outcome = ToolOutcome::from_run(run, || {
        non_empty_file(out_path).then(|| out_path.to_path_buf())
    });

    if !outcome.is_produced() {
        warn!(video = %video.display(), "Audio extraction {}", outcome);
    }
    outcome
}

/// List the frame files in `dir`, sorted by index.
pub async fn list_frames(dir: impl AsRef<Path>) -> MediaResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut frames = Vec::new();

    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(frames),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if name.to_str().map(is_frame_file_name).unwrap_or(false) {
            frames.push(entry.path());
        }
    }

    // Zero-padded names sort in index order.
    frames.sort();
    Ok(frames)
}

pub(crate) fn non_empty_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}
