//! Canonical watermark positions.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::region::WatermarkRegion;

/// One of the five places the detector is asked to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl WatermarkPosition {
    pub const ALL: [WatermarkPosition; 5] = [
        WatermarkPosition::TopLeft,
        WatermarkPosition::TopRight,
        WatermarkPosition::BottomLeft,
        WatermarkPosition::BottomRight,
        WatermarkPosition::Center,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WatermarkPosition::TopLeft => "top-left",
            WatermarkPosition::TopRight => "top-right",
            WatermarkPosition::BottomLeft => "bottom-left",
            WatermarkPosition::BottomRight => "bottom-right",
            WatermarkPosition::Center => "center",
        }
    }

    /// Fixed frame-relative rectangle for this position.
    pub fn region(&self) -> WatermarkRegion {
        match self {
            WatermarkPosition::TopLeft => WatermarkRegion::new(0.0, 0.0, 0.3, 0.15),
            WatermarkPosition::TopRight => WatermarkRegion::new(0.7, 0.0, 0.3, 0.15),
            WatermarkPosition::BottomLeft => WatermarkRegion::new(0.0, 0.85, 0.3, 0.15),
            WatermarkPosition::BottomRight => WatermarkRegion::new(0.7, 0.85, 0.3, 0.15),
            WatermarkPosition::Center => WatermarkRegion::new(0.35, 0.4, 0.3, 0.2),
        }
    }
}

impl Default for WatermarkPosition {
    /// Most stock watermarks sit in the bottom-right corner.
    fn default() -> Self {
        WatermarkPosition::BottomRight
    }
}

impl fmt::Display for WatermarkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
