//! Frame and video encoding configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Codec pair for WebM containers
pub const WEBM_VIDEO_CODEC: &str = "libvpx-vp9";
pub const WEBM_AUDIO_CODEC: &str = "libopus";
/// Pixel format for reassembled video
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";
/// Default CRF (Constant Rate Factor)
pub const DEFAULT_CRF: u8 = 18;

/// Frames sampled per second of source video
pub const DEFAULT_EXTRACTION_FPS: u32 = 1;
/// `-q:v` passed while sampling frames
pub const FRAME_QUALITY: u8 = 2;
/// Assumed source frame rate when ffprobe output can't be parsed
pub const DEFAULT_SOURCE_FPS: f64 = 30.0;

/// Frame file naming: `frame_00001.png`, `frame_00002.png`, ...
pub const FRAME_PREFIX: &str = "frame_";
pub const FRAME_EXTENSION: &str = "png";
pub const FRAME_PATTERN: &str = "frame_%05d.png";

/// Audio track extracted alongside the frames (Matroska audio accepts any codec)
pub const AUDIO_FILE_NAME: &str = "audio.mka";

/// File name of the 1-indexed frame `index`.
pub fn frame_file_name(index: u32) -> String {
    format!("{}{:05}.{}", FRAME_PREFIX, index, FRAME_EXTENSION)
}

/// Whether `name` follows the frame naming scheme.
pub fn is_frame_file_name(name: &str) -> bool {
    name.strip_prefix(FRAME_PREFIX)
        .and_then(|rest| rest.strip_suffix(&format!(".{}", FRAME_EXTENSION)))
        .map(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// Video encoding configuration used by reassembly.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EncodingConfig {
    /// Video codec (e.g., "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Pixel format
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,

    /// Constant Rate Factor (quality, 0-51, lower is better)
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// Audio codec used when muxing the extracted track
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_pixel_format() -> String {
    DEFAULT_PIXEL_FORMAT.to_string()
}
fn default_crf() -> u8 {
    DEFAULT_CRF
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
            crf: DEFAULT_CRF,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
        }
    }
}

impl EncodingConfig {
    /// Encoding settings suited to an output container.
    pub fn for_format(format: crate::OutputFormat) -> Self {
        Self {
            codec: format.video_codec().to_string(),
            audio_codec: format.audio_codec().to_string(),
            ..Self::default()
        }
    }
}
