//! Watermark detection results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::position::WatermarkPosition;
use crate::region::WatermarkRegion;

/// Reported confidence when a watermark was found.
pub const CONFIDENCE_FOUND: f64 = 0.8;
/// Reported confidence when the detector saw no watermark.
pub const CONFIDENCE_NOT_FOUND: f64 = 0.9;
/// Reported confidence when the detector could not be consulted.
pub const CONFIDENCE_ERROR: f64 = 0.5;

/// Wire-level detection result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectionResult {
    pub has_watermark: bool,
    #[serde(default)]
    pub area: Option<WatermarkRegion>,
    #[serde(default)]
    pub confidence: f64,
}

/// What the locator actually observed.
///
/// Keeps "no watermark" and "detector unreachable" apart; both map to
/// `has_watermark = false` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DetectionOutcome {
    Detected {
        position: WatermarkPosition,
        region: WatermarkRegion,
    },
    NotFound,
    Error {
        reason: String,
    },
}

impl DetectionOutcome {
    pub fn detected(position: WatermarkPosition) -> Self {
        Self::Detected {
            position,
            region: position.region(),
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error {
            reason: reason.into(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionOutcome::Detected { .. } => "detected",
            DetectionOutcome::NotFound => "not_found",
            DetectionOutcome::Error { .. } => "error",
        }
    }

    /// Region to inpaint, if any.
    pub fn region(&self) -> Option<WatermarkRegion> {
        match self {
            DetectionOutcome::Detected { region, .. } => Some(*region),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            DetectionOutcome::Error { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn to_result(&self) -> DetectionResult {
        match self {
            DetectionOutcome::Detected { region, .. } => DetectionResult {
                has_watermark: true,
                area: Some(*region),
                confidence: CONFIDENCE_FOUND,
            },
            DetectionOutcome::NotFound => DetectionResult {
                has_watermark: false,
                area: None,
                confidence: CONFIDENCE_NOT_FOUND,
            },
            DetectionOutcome::Error { .. } => DetectionResult {
                has_watermark: false,
                area: None,
                confidence: CONFIDENCE_ERROR,
            },
        }
    }
}
