//! Stream queries through `ffprobe`.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::warn;

use crate::command::{check_ffprobe, stderr_tail};
use crate::error::{MediaError, MediaResult};
use wmr_models::encoding::DEFAULT_SOURCE_FPS;

/// Print `entries` of the streams matched by `select`, one value per line.
async fn query_streams(path: &Path, select: &str, entries: &str) -> MediaResult<String> {
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }
    check_ffprobe()?;

    let output = Command::new("ffprobe")
        .args(["-v", "error", "-select_streams", select, "-show_entries"])
        .arg(format!("stream={}", entries))
        .args(["-of", "default=noprint_wrappers=1:nokey=1"])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| MediaError::Spawn {
            tool: "ffprobe",
            source,
        })?;

    if !output.status.success() {
        return Err(MediaError::tool_exited(
            "ffprobe",
            output.status.code(),
            Some(stderr_tail(&output.stderr)),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Native frame rate of the first video stream.
///
/// Never fails: anything that can't be read or parsed yields 30 fps.
pub async fn probe_frame_rate(path: impl AsRef<Path>) -> f64 {
    let path = path.as_ref();
    match query_streams(path, "v:0", "r_frame_rate").await {
        Ok(text) => text
            .lines()
            .next()
            .and_then(parse_frame_rate)
            .unwrap_or(DEFAULT_SOURCE_FPS),
        Err(e) => {
            warn!(video = %path.display(), "Frame rate probe failed, assuming {} fps: {}", DEFAULT_SOURCE_FPS, e);
            DEFAULT_SOURCE_FPS
        }
    }
}

/// Whether the file has at least one audio stream.
pub async fn has_audio_stream(path: impl AsRef<Path>) -> MediaResult<bool> {
    let text = query_streams(path.as_ref(), "a", "index").await?;
    Ok(!text.trim().is_empty())
}

/// Duration in seconds of the first video stream.
pub async fn stream_duration(path: impl AsRef<Path>) -> MediaResult<f64> {
    let path = path.as_ref();
    let text = query_streams(path, "v:0", "duration").await?;
    text.lines()
        .next()
        .and_then(|line| line.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| MediaError::internal(format!("no duration reported for {}", path.display())))
}

/// `num/den` or a plain decimal; `None` unless finite and positive.
pub fn parse_frame_rate(s: &str) -> Option<f64> {
    let s = s.trim();
    let fps = match s.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            num / den
        }
        None => s.parse().ok()?,
    };
    (fps.is_finite() && fps > 0.0).then_some(fps)
}
