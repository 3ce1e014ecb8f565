//! Reassembly of processed frames into a video container.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::frames::non_empty_file;
use crate::outcome::ToolOutcome;
use wmr_models::encoding::FRAME_PATTERN;
use wmr_models::EncodingConfig;

/// Build the reassembly command.
pub fn build_assemble_command(
    frames_dir: &Path,
    out_path: &Path,
    fps: f64,
    audio: Option<&Path>,
    encoding: &EncodingConfig,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(frames_dir.join(FRAME_PATTERN), out_path).input_framerate(fps);

    if let Some(audio) = audio {
        cmd = cmd.extra_input(audio).audio_codec(&encoding.audio_codec);
    }

    cmd.video_codec(&encoding.codec)
        .pixel_format(&encoding.pixel_format)
        .crf(encoding.crf)
}

/// Encode `frames_dir/frame_%05d.png` at `fps` into `out_path`.
///
/// The audio track is muxed in when `audio` is given and exists on disk. The
/// result is only [`ToolOutcome::Produced`] when `out_path` exists and is
/// non-empty afterwards.
pub async fn assemble_video(
    frames_dir: impl AsRef<Path>,
    out_path: impl AsRef<Path>,
    fps: f64,
    audio: Option<&Path>,
    encoding: &EncodingConfig,
) -> ToolOutcome<PathBuf> {
    let frames_dir = frames_dir.as_ref();
    let out_path = out_path.as_ref();
    let audio = audio.filter(|a| a.exists());

    let cmd = build_assemble_command(frames_dir, out_path, fps, audio, encoding);
    let run = FfmpegRunner::new().run(&cmd).await;

    let outcome = ToolOutcome::from_run(run, || {
        non_empty_file(out_path).then(|| out_path.to_path_buf())
    });

    match &outcome {
        ToolOutcome::Produced(path) => info!(
            output = %path.display(),
            with_audio = audio.is_some(),
            "Assembled video"
        ),
        other => warn!(output = %out_path.display(), "Assembly {}", other),
    }
    outcome
}
