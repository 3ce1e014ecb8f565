//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::config::is_production_env;
use wmr_media::MediaError;
use wmr_pipeline::PipelineError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Pipeline(e) if e.is_bad_request() => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(_) | ApiError::Media(_) | ApiError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message sent to the client. Server errors are masked in production.
    fn public_detail(&self, production: bool) -> String {
        if production && self.status_code().is_server_error() {
            return "An internal error occurred".to_string();
        }
        match self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let production = std::env::var("ENVIRONMENT")
            .map(|env| is_production_env(&env))
            .unwrap_or(false);
        let detail = self.public_detail(production);

        if status.is_server_error() {
            tracing::error!(status = %status, "Request failed: {}", self);
        }

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmr_models::RegionError;

    #[test]
    fn test_pipeline_error_status() {
        assert_eq!(
            ApiError::from(PipelineError::VideoNotFound("/x.mp4".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(PipelineError::NoFrames).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(PipelineError::InvalidRegion(RegionError::NonFinite)).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(PipelineError::Media(MediaError::ToolMissing("ffmpeg"))).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(PipelineError::assembly_failed("empty")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_masked_in_production() {
        let internal = ApiError::from(PipelineError::assembly_failed("ffmpeg wrote nothing"));
        assert_eq!(internal.public_detail(true), "An internal error occurred");
        assert!(internal.public_detail(false).contains("ffmpeg wrote nothing"));

        let client = ApiError::bad_request("fps must be positive");
        assert_eq!(client.public_detail(true), "fps must be positive");
    }

    #[test]
    fn test_production_env_ignores_case() {
        for env in ["production", "Production", "PRODUCTION", " production\n"] {
            assert!(is_production_env(env), "{:?}", env);
        }
        for env in ["", "development", "prod"] {
            assert!(!is_production_env(env), "{:?}", env);
        }
    }
}
