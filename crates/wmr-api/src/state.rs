//! Application state.

use std::sync::Arc;

use wmr_media::{FfmpegTranscoder, Transcoder};
use wmr_ml_client::{InpaintClient, InpaintModel, VisionClient, VisionModel};
use wmr_pipeline::{FrameInpainter, Pipeline, PipelineConfig, WatermarkLocator};

use crate::config::ApiConfig;

/// Shared application state.
///
/// The model clients are built once and shared by every request and job.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Pipeline,
}

impl AppState {
    /// Create new application state from the environment.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let pipeline_config = PipelineConfig::from_env();
        pipeline_config.ensure_dirs().await?;

        let vision: Arc<dyn VisionModel> = Arc::new(VisionClient::from_env()?);
        let inpaint: Arc<dyn InpaintModel> = Arc::new(InpaintClient::from_env()?);

        Ok(Self::with_parts(
            config,
            pipeline_config,
            Arc::new(FfmpegTranscoder::new()),
            vision,
            inpaint,
        ))
    }

    /// Assemble state from explicit collaborators.
    pub fn with_parts(
        config: ApiConfig,
        pipeline_config: PipelineConfig,
        transcoder: Arc<dyn Transcoder>,
        vision: Arc<dyn VisionModel>,
        inpaint: Arc<dyn InpaintModel>,
    ) -> Self {
        let pipeline = Pipeline::new(
            pipeline_config,
            transcoder,
            WatermarkLocator::new(vision),
            FrameInpainter::new(inpaint),
        );
        Self { config, pipeline }
    }
}
