//! Shared data models for the watermark removal pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Normalized watermark regions and their pixel projections
//! - Canonical watermark positions
//! - Detection results and tagged detection outcomes
//! - Jobs, job states and pipeline requests/results
//! - Encoding constants shared by extraction and reassembly

pub mod detection;
pub mod encoding;
pub mod job;
pub mod position;
pub mod region;

// Re-export common types
pub use detection::{DetectionOutcome, DetectionResult};
pub use encoding::EncodingConfig;
pub use job::{
    FrameOutcome, FrameStats, JobId, JobState, OutputFormat, ProcessVideoRequest,
    ProcessVideoResult,
};
pub use position::WatermarkPosition;
pub use region::{ClampedRegion, PixelRect, RegionError, WatermarkRegion};
