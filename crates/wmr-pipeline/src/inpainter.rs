//! Frame inpainter: mask one region and hand it to the inpainting model.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use wmr_media::{build_mask_png, prepare_png};
use wmr_ml_client::InpaintModel;
use wmr_models::WatermarkRegion;

/// Result of inpainting one frame. Both variants carry PNG-ready bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InpaintOutcome {
    /// Cleaned frame, PNG-encoded
    Inpainted(Vec<u8>),
    /// The original frame, untouched
    PassedThrough { bytes: Vec<u8>, reason: String },
}

impl InpaintOutcome {
    fn passed_through(bytes: &[u8], reason: impl Into<String>) -> Self {
        InpaintOutcome::PassedThrough {
            bytes: bytes.to_vec(),
            reason: reason.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            InpaintOutcome::Inpainted(bytes) => bytes,
            InpaintOutcome::PassedThrough { bytes, .. } => bytes,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            InpaintOutcome::Inpainted(bytes) => bytes,
            InpaintOutcome::PassedThrough { bytes, .. } => bytes,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InpaintOutcome::Inpainted(_) => "inpainted",
            InpaintOutcome::PassedThrough { .. } => "passed_through",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            InpaintOutcome::PassedThrough { reason, .. } => Some(reason),
            InpaintOutcome::Inpainted(_) => None,
        }
    }
}

impl fmt::Display for InpaintOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Removes a watermark from single frames.
#[derive(Clone)]
pub struct FrameInpainter {
    model: Arc<dyn InpaintModel>,
}

impl FrameInpainter {
    pub fn new(model: Arc<dyn InpaintModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Arc<dyn InpaintModel> {
        &self.model
    }

    /// Inpaint `region` of `frame`.
    ///
    /// Any failure (undecodable input, empty mask, transport error, non-200
    /// reply, undecodable reply) yields [`InpaintOutcome::PassedThrough`] with
    /// the original bytes.
    pub async fn remove(&self, frame: &[u8], region: &WatermarkRegion) -> InpaintOutcome {
        let prepared = match prepare_png(frame) {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!("Frame could not be decoded, passing through: {}", e);
                return InpaintOutcome::passed_through(frame, format!("undecodable frame: {}", e));
            }
        };

        let rect = region.to_pixels(prepared.width, prepared.height);
        if rect.is_empty() {
            return InpaintOutcome::passed_through(frame, "region covers no pixels");
        }

        let mask = match build_mask_png(prepared.width, prepared.height, &rect) {
            Ok(mask) => mask,
            Err(e) => return InpaintOutcome::passed_through(frame, format!("mask encoding: {}", e)),
        };

        match self.model.inpaint(prepared.png, mask).await {
            Ok(cleaned) => match prepare_png(&cleaned) {
                Ok(cleaned) => InpaintOutcome::Inpainted(cleaned.png),
                Err(e) => {
                    warn!("Inpainter returned an undecodable image: {}", e);
                    InpaintOutcome::passed_through(frame, format!("undecodable inpaint result: {}", e))
                }
            },
            Err(e) => {
                warn!(error_kind = e.kind(), "Inpainting failed, passing through: {}", e);
                InpaintOutcome::passed_through(frame, e.to_string())
            }
        }
    }
}
