//! Watermark locator: one detector round-trip per frame.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::classify::classify;
use crate::metrics;
use wmr_ml_client::VisionModel;
use wmr_models::DetectionOutcome;

/// Prompt sent with every frame.
pub const DETECTION_PROMPT: &str = "Analyze this image and detect any watermarks, logos, or text overlays.
If you find a watermark, describe its location (top-left, top-right, bottom-left, bottom-right, center).
If no watermark is found, say \"No watermark detected\".
Be concise.";

/// Asks a vision model where the watermark is.
#[derive(Clone)]
pub struct WatermarkLocator {
    model: Arc<dyn VisionModel>,
}

impl WatermarkLocator {
    pub fn new(model: Arc<dyn VisionModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Arc<dyn VisionModel> {
        &self.model
    }

    /// Locate the watermark in one encoded frame.
    ///
    /// Transport and decoding failures come back as
    /// [`DetectionOutcome::Error`]; this never fails.
    pub async fn detect(&self, frame: &[u8]) -> DetectionOutcome {
        let outcome = match self.model.describe(DETECTION_PROMPT, frame).await {
            Ok(text) => {
                debug!(response = %text, "Detector answered");
                match classify(&text) {
                    Some(position) => DetectionOutcome::detected(position),
                    None => DetectionOutcome::NotFound,
                }
            }
            Err(e) => {
                warn!(error_kind = e.kind(), "Watermark detection failed: {}", e);
                DetectionOutcome::error(e.to_string())
            }
        };

        metrics::record_detection(outcome.as_str());
        outcome
    }
}
