//! Single-image watermark detection and removal.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use wmr_media::prepare_png;
use wmr_models::{DetectionOutcome, DetectionResult, WatermarkPosition, WatermarkRegion};
use wmr_pipeline::resolve_region;

use crate::error::{ApiError, ApiResult};
use crate::handlers::upload::read_file_field;
use crate::state::AppState;

/// Response header naming how `/remove-watermark` produced its image.
pub const INPAINT_OUTCOME_HEADER: &str = "x-inpaint-outcome";

/// Detection result plus the tagged outcome behind it.
#[derive(Debug, Serialize)]
pub struct DetectResponse {
    #[serde(flatten)]
    pub result: DetectionResult,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<WatermarkPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&DetectionOutcome> for DetectResponse {
    fn from(outcome: &DetectionOutcome) -> Self {
        let position = match outcome {
            DetectionOutcome::Detected { position, .. } => Some(*position),
            _ => None,
        };
        Self {
            result: outcome.to_result(),
            outcome: outcome.as_str(),
            position,
            reason: outcome.reason().map(str::to_string),
        }
    }
}

/// POST /detect-watermark
pub async fn detect_watermark(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<DetectResponse>> {
    let upload = read_file_field(multipart).await?;
    let outcome = state.pipeline.locator().detect(&upload.bytes).await;
    Ok(Json(DetectResponse::from(&outcome)))
}

/// Region query for `/remove-watermark`; defaults to the bottom-right corner.
#[derive(Debug, Deserialize)]
pub struct RemoveWatermarkQuery {
    #[serde(default = "default_x")]
    pub x: f64,
    #[serde(default = "default_y")]
    pub y: f64,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
}

fn default_x() -> f64 {
    WatermarkPosition::BottomRight.region().x
}

fn default_y() -> f64 {
    WatermarkPosition::BottomRight.region().y
}

fn default_width() -> f64 {
    WatermarkPosition::BottomRight.region().width
}

fn default_height() -> f64 {
    WatermarkPosition::BottomRight.region().height
}

impl RemoveWatermarkQuery {
    fn region(&self) -> WatermarkRegion {
        WatermarkRegion::new(self.x, self.y, self.width, self.height)
    }
}

/// POST /remove-watermark?x&y&width&height
///
/// Always answers with a PNG; `X-Inpaint-Outcome` says whether it was
/// inpainted or passed through.
pub async fn remove_watermark(
    State(state): State<AppState>,
    query: Result<Query<RemoveWatermarkQuery>, QueryRejection>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let region = resolve_region(&query.region())?;

    let upload = read_file_field(multipart).await?;
    let image = prepare_png(&upload.bytes)
        .map_err(|e| ApiError::bad_request(format!("Uploaded file is not a decodable image: {}", e)))?;

    let outcome = state.pipeline.inpainter().remove(&image.png, &region).await;
    let label = outcome.as_str();

    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"cleaned.png\""),
            (header::HeaderName::from_static(INPAINT_OUTCOME_HEADER), label),
        ],
        outcome.into_bytes(),
    )
        .into_response())
}
