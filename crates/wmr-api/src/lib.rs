//! Axum HTTP API for the watermark removal pipeline.
//!
//! This crate provides:
//! - Standalone frame extraction, detection and inpainting endpoints
//! - The full `/process-video` pipeline with download and cleanup by job id
//! - Liveness/readiness probes and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
