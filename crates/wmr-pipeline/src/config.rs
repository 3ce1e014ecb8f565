//! Pipeline configuration.

use std::path::{Path, PathBuf};

use wmr_models::encoding::DEFAULT_EXTRACTION_FPS;
use wmr_models::{JobId, OutputFormat};

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Parent of every per-job working directory
    pub temp_dir: PathBuf,
    /// Where finished videos are published
    pub output_dir: PathBuf,
    /// Frames sampled per second of source video; also the reassembly rate
    pub extraction_fps: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::under(Path::new("/media"))
    }
}

impl PipelineConfig {
    /// Default layout below one media root.
    pub fn under(media_dir: &Path) -> Self {
        Self {
            temp_dir: media_dir.join("temp"),
            output_dir: media_dir.join("processed"),
            extraction_fps: DEFAULT_EXTRACTION_FPS,
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let media_dir = std::env::var("MEDIA_DIR").unwrap_or_else(|_| "/media".to_string());
        let defaults = Self::under(Path::new(&media_dir));

        Self {
            temp_dir: std::env::var("TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.temp_dir),
            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            extraction_fps: std::env::var("EXTRACTION_FPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|fps: &u32| *fps > 0)
                .unwrap_or(defaults.extraction_fps),
        }
    }

    /// `<temp_dir>/<job_id>`
    pub fn job_dir(&self, job_id: &JobId) -> PathBuf {
        self.temp_dir.join(job_id.as_str())
    }

    /// `<output_dir>/<job_id>.<ext>`
    pub fn output_path(&self, job_id: &JobId, format: OutputFormat) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", job_id.as_str(), format.extension()))
    }

    /// Create the temp and output directories.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.temp_dir).await?;
        tokio::fs::create_dir_all(&self.output_dir).await
    }
}
