//! Health check handlers.

use std::future::Future;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use wmr_media::{check_ffmpeg, check_ffprobe};

use crate::state::AppState;

const SERVICE_NAME: &str = "video-processor";

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub ffmpeg: CheckStatus,
    pub ffprobe: CheckStatus,
    pub detector: CheckStatus,
    pub inpainter: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl CheckStatus {
    fn ok(latency_ms: Option<u64>) -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
            latency_ms,
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(msg.into()),
            latency_ms: None,
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

async fn timed_probe<F>(name: &str, probe: F) -> CheckStatus
where
    F: Future<Output = bool>,
{
    let start = Instant::now();
    if probe.await {
        CheckStatus::ok(Some(start.elapsed().as_millis() as u64))
    } else {
        CheckStatus::error(format!("{} unreachable", name))
    }
}

/// Readiness check endpoint (readiness probe).
/// Checks the transcoding binaries and both model endpoints.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let ffmpeg = match check_ffmpeg() {
        Ok(_) => CheckStatus::ok(None),
        Err(e) => CheckStatus::error(e.to_string()),
    };
    let ffprobe = match check_ffprobe() {
        Ok(_) => CheckStatus::ok(None),
        Err(e) => CheckStatus::error(e.to_string()),
    };

    let pipeline = &state.pipeline;
    let (detector, inpainter) = tokio::join!(
        timed_probe("detector", pipeline.locator().model().health_check()),
        timed_probe("inpainter", pipeline.inpainter().model().health_check()),
    );

    let all_ok = ffmpeg.is_ok() && ffprobe.is_ok() && detector.is_ok() && inpainter.is_ok();

    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks: ReadinessChecks {
            ffmpeg,
            ffprobe,
            detector,
            inpainter,
        },
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
