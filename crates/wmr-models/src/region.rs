//! Normalized watermark regions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance used when comparing normalized coordinates.
const EPSILON: f64 = 1e-9;

/// A normalized rectangle (0.0 to 1.0) marking the watermark inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WatermarkRegion {
    /// X coordinate of the top-left corner (0.0 = left, 1.0 = right)
    pub x: f64,
    /// Y coordinate of the top-left corner (0.0 = top, 1.0 = bottom)
    pub y: f64,
    /// Width of the rectangle (0.0 to 1.0)
    pub width: f64,
    /// Height of the rectangle (0.0 to 1.0)
    pub height: f64,
}

/// Reasons a region cannot be used at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("watermark region contains a non-finite coordinate")]
    NonFinite,

    #[error("watermark region is empty once clamped to the frame")]
    Empty,
}

/// Result of clamping a region into the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampedRegion {
    pub region: WatermarkRegion,
    /// True when any coordinate had to move.
    pub adjusted: bool,
}

/// A rectangle in absolute pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl WatermarkRegion {
    /// Create a new region.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Check if the region is inside the unit square.
    pub fn is_valid(&self) -> bool {
        self.is_finite()
            && self.x >= 0.0
            && self.y >= 0.0
            && self.width > 0.0
            && self.height > 0.0
            && self.x + self.width <= 1.0 + EPSILON
            && self.y + self.height <= 1.0 + EPSILON
    }

    fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Clamp the region into the unit square.
    ///
    /// The left/top edges are clamped to `[0, 1]` and the right/bottom edges
    /// to `[left, 1]`, so `x + width <= 1` and `y + height <= 1` always hold
    /// afterwards.
    pub fn clamp_to_frame(&self) -> Result<ClampedRegion, RegionError> {
        if !self.is_finite() {
            return Err(RegionError::NonFinite);
        }

        let left = self.x.clamp(0.0, 1.0);
        let right = (self.x + self.width).clamp(left, 1.0);
        let top = self.y.clamp(0.0, 1.0);
        let bottom = (self.y + self.height).clamp(top, 1.0);

        let region = WatermarkRegion::new(left, top, right - left, bottom - top);
        if region.width <= EPSILON || region.height <= EPSILON {
            return Err(RegionError::Empty);
        }

        let adjusted = (region.x - self.x).abs() > EPSILON
            || (region.y - self.y).abs() > EPSILON
            || (region.width - self.width).abs() > EPSILON
            || (region.height - self.height).abs() > EPSILON;

        Ok(ClampedRegion { region, adjusted })
    }

    /// Project the region onto a `frame_width` x `frame_height` frame.
    ///
    /// Coordinates are truncated towards zero and the result never extends
    /// past the frame edges.
    pub fn to_pixels(&self, frame_width: u32, frame_height: u32) -> PixelRect {
        let x = scale(self.x, frame_width);
        let y = scale(self.y, frame_height);
        let width = scale(self.width, frame_width).min(frame_width - x);
        let height = scale(self.height, frame_height).min(frame_height - y);

        PixelRect {
            x,
            y,
            width,
            height,
        }
    }
}

fn scale(fraction: f64, dimension: u32) -> u32 {
    let value = (fraction.clamp(0.0, 1.0) * f64::from(dimension)).floor();
    (value as u32).min(dimension)
}

impl PixelRect {
    /// Convert back to frame-relative coordinates.
    pub fn to_normalized(&self, frame_width: u32, frame_height: u32) -> WatermarkRegion {
        let fw = f64::from(frame_width.max(1));
        let fh = f64::from(frame_height.max(1));
        WatermarkRegion::new(
            f64::from(self.x) / fw,
            f64::from(self.y) / fh,
            f64::from(self.width) / fw,
            f64::from(self.height) / fh,
        )
    }

    /// Whether pixel `(px, py)` lies inside the rectangle.
    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
