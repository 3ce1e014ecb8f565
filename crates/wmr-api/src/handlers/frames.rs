//! Standalone frame extraction.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use wmr_models::JobId;
use wmr_pipeline::ExtractedFrames;

use crate::error::{ApiError, ApiResult};
use crate::handlers::upload::read_file_field;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractFramesQuery {
    pub fps: Option<f64>,
}

/// POST /extract-frames?fps=1
///
/// Stores the upload under a fresh job id and samples it into
/// `<temp_dir>/<job_id>/frames`. The frames stay until `/cleanup/:job_id`.
pub async fn extract_frames(
    State(state): State<AppState>,
    query: Result<Query<ExtractFramesQuery>, QueryRejection>,
    multipart: Multipart,
) -> ApiResult<Json<ExtractedFrames>> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let fps = query
        .fps
        .unwrap_or_else(|| f64::from(state.pipeline.config().extraction_fps));
    if !fps.is_finite() || fps <= 0.0 {
        return Err(ApiError::bad_request("fps must be a positive number"));
    }

    let upload = read_file_field(multipart).await?;

    let job_id = JobId::new();
    let job_dir = state.pipeline.config().job_dir(&job_id);
    fs::create_dir_all(&job_dir).await?;

    let extension = upload.extension().unwrap_or_else(|| "mp4".to_string());
    let video_path = job_dir.join(format!("input.{}", extension));
    fs::write(&video_path, &upload.bytes).await?;

    match state
        .pipeline
        .extract_frames_job(&job_id, &video_path, fps)
        .await
    {
        Ok(extracted) => Ok(Json(extracted)),
        Err(e) => {
            if let Err(ce) = state.pipeline.cleanup(&job_id).await {
                warn!(job_id = %job_id, "Cleanup after failed extraction failed: {}", ce);
            }
            Err(e.into())
        }
    }
}
