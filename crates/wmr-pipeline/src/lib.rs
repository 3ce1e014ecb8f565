//! Watermark removal pipeline.
//!
//! Drives a job from a source video to a cleaned output:
//! 1. sample frames and copy the audio track
//! 2. locate the watermark once, on the first frame (or take the caller's region)
//! 3. inpaint every frame against that one region, in order
//! 4. re-encode the frames with the audio and publish `<output_dir>/<job_id>.<ext>`
//!
//! Model failures never fail a job: the locator reports
//! [`DetectionOutcome::Error`](wmr_models::DetectionOutcome) and the inpainter
//! passes the frame through unchanged.

pub mod classify;
pub mod config;
pub mod error;
pub mod inpainter;
pub mod locator;
pub mod logging;
pub mod metrics;
pub mod processor;

pub use classify::classify;
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use inpainter::{FrameInpainter, InpaintOutcome};
pub use locator::{WatermarkLocator, DETECTION_PROMPT};
pub use logging::JobLogger;
pub use processor::{resolve_region, CleanupReport, ExtractedFrames, Job, Pipeline};
