//! FFmpeg CLI wrapper for the watermark removal pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Frame sampling, audio extraction and frame-rate probing
//! - Reassembly of processed frames with optional audio muxing
//! - Binary mask rasterisation for inpainting
//! - A `Transcoder` seam so the orchestrator can run without ffmpeg in tests
//!
//! Every process invocation reports a [`ToolOutcome`] so callers can tell a
//! tool that produced its output from one that ran but produced nothing, and
//! from one that could not be started.

pub mod assemble;
pub mod command;
pub mod error;
pub mod frames;
pub mod fs_utils;
pub mod mask;
pub mod outcome;
pub mod probe;
pub mod transcoder;

pub use assemble::assemble_video;
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use frames::{extract_audio, extract_frames, list_frames};
pub use fs_utils::{move_file, remove_dir_if_exists, remove_file_if_exists};
pub use mask::{build_mask, build_mask_png, prepare_png, PreparedImage};
pub use outcome::ToolOutcome;
pub use probe::{has_audio_stream, parse_frame_rate, probe_frame_rate, stream_duration};
pub use transcoder::{FfmpegTranscoder, Transcoder};
