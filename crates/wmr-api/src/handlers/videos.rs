//! Full pipeline, download and cleanup handlers.

use axum::body::{Body, Bytes};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::stream::{self, Stream};
use serde::Serialize;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use wmr_models::{JobId, ProcessVideoRequest, ProcessVideoResult};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const DOWNLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Chunks of `file` until EOF.
fn file_chunks(file: File) -> impl Stream<Item = std::io::Result<Bytes>> {
    stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0u8; DOWNLOAD_CHUNK_SIZE];
        let read = file.read(&mut buf).await?;
        if read == 0 {
            return Ok(None);
        }
        buf.truncate(read);
        Ok::<_, std::io::Error>(Some((Bytes::from(buf), file)))
    })
}

fn parse_job_id(raw: &str) -> ApiResult<JobId> {
    JobId::parse(raw).ok_or_else(|| ApiError::bad_request(format!("Invalid job id: {:?}", raw)))
}

/// POST /process-video
pub async fn process_video(
    State(state): State<AppState>,
    payload: Result<Json<ProcessVideoRequest>, JsonRejection>,
) -> ApiResult<Json<ProcessVideoResult>> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let result = state.pipeline.process_video(&request).await?;
    Ok(Json(result))
}

/// GET /download/:job_id
pub async fn download_video(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Response> {
    let job_id = parse_job_id(&job_id)?;

    let (path, format) = state
        .pipeline
        .find_output(&job_id)
        .await
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    let file = File::open(&path).await?;
    let length = file.metadata().await?.len();
    let disposition = format!(
        "attachment; filename=\"processed_{}.{}\"",
        job_id,
        format.extension()
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, length.to_string()),
        ],
        Body::from_stream(file_chunks(file)),
    )
        .into_response())
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub status: &'static str,
}

/// DELETE /cleanup/:job_id
pub async fn cleanup_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<CleanupResponse>> {
    let job_id = parse_job_id(&job_id)?;
    state.pipeline.cleanup(&job_id).await?;
    Ok(Json(CleanupResponse { status: "cleaned" }))
}
