//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Lines of stderr kept when a command fails.
const STDERR_TAIL_LINES: usize = 20;

/// An `ffmpeg` invocation: inputs in order, then output options, then the
/// output path. Always overwrites and runs at `-v error`.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Options placed before the first `-i`
    pre_input: Vec<String>,
    inputs: Vec<PathBuf>,
    options: Vec<String>,
    output: PathBuf,
}

impl FfmpegCommand {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            pre_input: Vec::new(),
            inputs: vec![input.as_ref().to_path_buf()],
            options: Vec::new(),
            output: output.as_ref().to_path_buf(),
        }
    }

    fn option(mut self, flag: &str, value: impl Into<String>) -> Self {
        self.options.push(flag.to_string());
        self.options.push(value.into());
        self
    }

    /// Another `-i`, after the ones already present.
    pub fn extra_input(mut self, input: impl AsRef<Path>) -> Self {
        self.inputs.push(input.as_ref().to_path_buf());
        self
    }

    /// Read the primary input as an image sequence at `fps`.
    pub fn input_framerate(mut self, fps: f64) -> Self {
        self.pre_input.push("-framerate".to_string());
        self.pre_input.push(format_rate(fps));
        self
    }

    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.option("-vf", filter)
    }

    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.option("-c:v", codec)
    }

    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.option("-c:a", codec)
    }

    pub fn pixel_format(self, format: impl Into<String>) -> Self {
        self.option("-pix_fmt", format)
    }

    pub fn crf(self, crf: u8) -> Self {
        self.option("-crf", crf.to_string())
    }

    /// `-q:v` for still-image outputs.
    pub fn quality(self, q: u8) -> Self {
        self.option("-q:v", q.to_string())
    }

    /// Drop video streams from the output.
    pub fn no_video(mut self) -> Self {
        self.options.push("-vn".to_string());
        self
    }

    pub fn build_args(&self) -> Vec<String> {
        let head = ["-y", "-hide_banner", "-v", "error"].map(String::from);
        let inputs = self
            .inputs
            .iter()
            .flat_map(|p| ["-i".to_string(), p.to_string_lossy().into_owned()]);

        head.into_iter()
            .chain(self.pre_input.iter().cloned())
            .chain(inputs)
            .chain(self.options.iter().cloned())
            .chain(std::iter::once(self.output.to_string_lossy().into_owned()))
            .collect()
    }
}

/// Format a frame rate without a trailing `.0` for integral values.
pub(crate) fn format_rate(fps: f64) -> String {
    if fps.fract() == 0.0 {
        format!("{}", fps as u64)
    } else {
        format!("{:.3}", fps)
    }
}

/// Runs [`FfmpegCommand`]s to completion, with no timeout.
#[derive(Debug, Default, Clone)]
pub struct FfmpegRunner;

impl FfmpegRunner {
    pub fn new() -> Self {
        Self
    }

    /// A non-zero exit becomes [`MediaError::ToolExited`] carrying the tail
    /// of stderr.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        check_ffmpeg()?;

        let args = cmd.build_args();
        debug!(args = %args.join(" "), "ffmpeg");

        let output = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| MediaError::Spawn {
                tool: "ffmpeg",
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(MediaError::tool_exited(
                "ffmpeg",
                output.status.code(),
                Some(stderr_tail(&output.stderr)),
            ))
        }
    }
}

/// Keep the last few lines of a tool's stderr.
pub(crate) fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Path of the `ffmpeg` binary.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::ToolMissing("ffmpeg"))
}

/// Path of the `ffprobe` binary.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::ToolMissing("ffprobe"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::new("input.mp4", "out/frame_%05d.png")
            .video_filter("fps=1")
            .quality(2);

        let args = cmd.build_args();
        assert_eq!(args[0], "-y");
        let i = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[i + 1], "input.mp4");
        assert!(args.windows(2).any(|w| w[0] == "-vf" && w[1] == "fps=1"));
        assert!(args.windows(2).any(|w| w[0] == "-q:v" && w[1] == "2"));
        assert_eq!(args.last().unwrap(), "out/frame_%05d.png");
    }

    #[test]
    fn test_input_args_precede_input() {
        let cmd = FfmpegCommand::new("frames/frame_%05d.png", "out.mp4")
            .input_framerate(1.0)
            .extra_input("audio.mka")
            .video_codec("libx264");

        let args = cmd.build_args();
        let framerate = args.iter().position(|a| a == "-framerate").unwrap();
        let first_input = args.iter().position(|a| a == "-i").unwrap();
        let codec = args.iter().position(|a| a == "-c:v").unwrap();
        assert_eq!(args[framerate + 1], "1");
        assert!(framerate < first_input);
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 2);
        assert!(args.iter().position(|a| a == "audio.mka").unwrap() < codec);
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(1.0), "1");
        assert_eq!(format_rate(29.97), "29.970");
    }

    #[test]
    fn test_stderr_tail() {
        let stderr: String = (0..30).map(|i| format!("line {}\n", i)).collect();
        let tail = stderr_tail(stderr.as_bytes());
        assert!(tail.starts_with("line 10"));
        assert!(tail.ends_with("line 29"));
    }
}
