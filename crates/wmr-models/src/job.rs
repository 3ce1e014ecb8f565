//! Pipeline job definitions.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::detection::DetectionOutcome;
use crate::encoding::{
    DEFAULT_AUDIO_CODEC, DEFAULT_VIDEO_CODEC, WEBM_AUDIO_CODEC, WEBM_VIDEO_CODEC,
};
use crate::region::WatermarkRegion;

/// Maximum accepted length of a job identifier.
const MAX_JOB_ID_LEN: usize = 64;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse a caller-supplied identifier.
    ///
    /// Only ASCII alphanumerics, `-` and `_` are accepted so an identifier can
    /// be joined onto a directory path safely.
    pub fn parse(s: &str) -> Option<Self> {
        let valid = !s.is_empty()
            && s.len() <= MAX_JOB_ID_LEN
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| Self(s.to_string()))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pipeline job state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[default]
    Created,
    FramesExtracted,
    /// Locator is being consulted on the first frame
    Detecting,
    FramesProcessed,
    Assembled,
    Done,
    /// Working files were removed
    Cleaned,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Created => "created",
            JobState::FramesExtracted => "frames_extracted",
            JobState::Detecting => "detecting",
            JobState::FramesProcessed => "frames_processed",
            JobState::Assembled => "assembled",
            JobState::Done => "done",
            JobState::Cleaned => "cleaned",
            JobState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Cleaned | JobState::Failed)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: JobState) -> bool {
        use JobState::*;

        match (self, next) {
            (_, Cleaned) => true,
            (state, Failed) => !state.is_terminal(),
            (Created, FramesExtracted) => true,
            (FramesExtracted, Detecting) => true,
            (FramesExtracted, FramesProcessed) => true,
            (Detecting, FramesProcessed) => true,
            (FramesProcessed, Assembled) => true,
            (Assembled, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mp4,
    Mkv,
    Avi,
    Webm,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Mp4,
        OutputFormat::Mkv,
        OutputFormat::Avi,
        OutputFormat::Webm,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Mkv => "mkv",
            OutputFormat::Avi => "avi",
            OutputFormat::Webm => "webm",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "video/mp4",
            OutputFormat::Mkv => "video/x-matroska",
            OutputFormat::Avi => "video/x-msvideo",
            OutputFormat::Webm => "video/webm",
        }
    }

    /// WebM only carries VP8/VP9/AV1, so it gets its own codec pair.
    pub fn video_codec(&self) -> &'static str {
        match self {
            OutputFormat::Webm => WEBM_VIDEO_CODEC,
            _ => DEFAULT_VIDEO_CODEC,
        }
    }

    pub fn audio_codec(&self) -> &'static str {
        match self {
            OutputFormat::Webm => WEBM_AUDIO_CODEC,
            _ => DEFAULT_AUDIO_CODEC,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('.').to_ascii_lowercase();
        OutputFormat::ALL
            .into_iter()
            .find(|f| f.extension() == s)
            .ok_or_else(|| format!("unsupported output format: {}", s))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Request to run the full pipeline on a server-local video.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProcessVideoRequest {
    /// Path to the source video on the server
    pub video_path: String,

    /// Ask the detector where the watermark is (ignored when
    /// `watermark_area` is set)
    #[serde(default = "default_detect_watermark")]
    pub detect_watermark: bool,

    /// Explicit region, bypasses detection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark_area: Option<WatermarkRegion>,

    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_detect_watermark() -> bool {
    true
}

impl ProcessVideoRequest {
    pub fn new(video_path: impl Into<String>) -> Self {
        Self {
            video_path: video_path.into(),
            detect_watermark: true,
            watermark_area: None,
            output_format: OutputFormat::default(),
        }
    }

    pub fn with_region(mut self, region: WatermarkRegion) -> Self {
        self.watermark_area = Some(region);
        self
    }

    pub fn with_detection(mut self, detect: bool) -> Self {
        self.detect_watermark = detect;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}

/// What happened to a single frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameOutcome {
    /// No region: the source frame was copied unmodified
    Copied,
    /// The inpainting endpoint returned a cleaned frame
    Inpainted,
    /// Inpainting failed, the source frame was kept
    PassedThrough { reason: String },
}

impl FrameOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameOutcome::Copied => "copied",
            FrameOutcome::Inpainted => "inpainted",
            FrameOutcome::PassedThrough { .. } => "passed_through",
        }
    }
}

/// Per-job frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FrameStats {
    pub copied: u32,
    pub inpainted: u32,
    pub passed_through: u32,
}

impl FrameStats {
    pub fn record(&mut self, outcome: &FrameOutcome) {
        match outcome {
            FrameOutcome::Copied => self.copied += 1,
            FrameOutcome::Inpainted => self.inpainted += 1,
            FrameOutcome::PassedThrough { .. } => self.passed_through += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.copied + self.inpainted + self.passed_through
    }
}

/// Result descriptor returned by a successful pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProcessVideoResult {
    pub job_id: JobId,
    pub output_path: String,
    pub frames_count: u32,
    pub watermark_detected: bool,
    pub watermark_area: Option<WatermarkRegion>,
    /// Present only when the detector was consulted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_outcome: Option<DetectionOutcome>,
    pub frames_inpainted: u32,
    pub frames_passed_through: u32,
}
