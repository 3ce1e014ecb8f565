//! API routes.

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{
    cleanup_job, detect_watermark, download_video, extract_frames, health, process_video, ready,
    remove_watermark,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let image_routes = Router::new()
        .route("/detect-watermark", post(detect_watermark))
        .route("/remove-watermark", post(remove_watermark));

    let video_routes = Router::new()
        .route("/extract-frames", post(extract_frames))
        .route("/process-video", post(process_video))
        .route("/download/:job_id", get(download_video))
        .route("/cleanup/:job_id", delete(cleanup_job));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(image_routes)
        .merge(video_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // Uploads are capped by MAX_BODY_SIZE alone.
        .layer(axum::extract::DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
