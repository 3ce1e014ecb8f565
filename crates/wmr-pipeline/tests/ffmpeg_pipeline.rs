//! Full pipeline run on a real clip with an audio track. Skipped when
//! ffmpeg/ffprobe are not on PATH.

use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;

use wmr_media::{check_ffmpeg, check_ffprobe, has_audio_stream, stream_duration, FfmpegTranscoder};
use wmr_ml_client::{InpaintModel, MlError, MlResult, VisionModel};
use wmr_models::{OutputFormat, ProcessVideoRequest, WatermarkRegion};
use wmr_pipeline::{FrameInpainter, Pipeline, PipelineConfig, WatermarkLocator};

const CLIP_SECONDS: f64 = 3.0;

fn tools_available() -> bool {
    if check_ffmpeg().is_err() || check_ffprobe().is_err() {
        eprintln!("ffmpeg/ffprobe not on PATH, skipping");
        return false;
    }
    true
}

/// 64x48 test pattern with a 440 Hz tone.
async fn synthesize_clip(path: &Path) {
    let duration = CLIP_SECONDS.to_string();
    let status = Command::new("ffmpeg")
        .args(["-y", "-v", "error", "-f", "lavfi", "-i"])
        .arg(format!("testsrc=size=64x48:rate=10:duration={}", duration))
        .args(["-f", "lavfi", "-i"])
        .arg(format!("sine=frequency=440:duration={}", duration))
        .args(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-c:a", "aac", "-shortest"])
        .arg(path)
        .stdin(Stdio::null())
        .status()
        .await
        .unwrap();
    assert!(status.success(), "could not synthesize the input clip");
}

struct UnusedVision;

#[async_trait]
impl VisionModel for UnusedVision {
    async fn describe(&self, _prompt: &str, _image: &[u8]) -> MlResult<String> {
        Err(MlError::ServiceUnavailable("not expected".to_string()))
    }

    async fn health_check(&self) -> bool {
        true
    }
}

/// Hands every frame back unchanged.
#[derive(Default)]
struct EchoInpaint {
    calls: AtomicUsize,
}

#[async_trait]
impl InpaintModel for EchoInpaint {
    async fn inpaint(&self, image_png: Vec<u8>, _mask_png: Vec<u8>) -> MlResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(image_png)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[tokio::test]
async fn test_process_video_keeps_audio_and_duration() {
    if !tools_available() {
        return;
    }

    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.mp4");
    synthesize_clip(&input).await;
    assert!(has_audio_stream(&input).await.unwrap());

    let config = PipelineConfig::under(dir.path());
    config.ensure_dirs().await.unwrap();
    let sampling_interval = 1.0 / f64::from(config.extraction_fps);

    let inpaint = Arc::new(EchoInpaint::default());
    let pipeline = Pipeline::new(
        config,
        Arc::new(FfmpegTranscoder::new()),
        WatermarkLocator::new(Arc::new(UnusedVision)),
        FrameInpainter::new(inpaint.clone()),
    );

    let request = ProcessVideoRequest::new(input.display().to_string())
        .with_region(WatermarkRegion::new(0.7, 0.0, 0.3, 0.15))
        .with_format(OutputFormat::Mp4);
    let result = pipeline.process_video(&request).await.unwrap();

    assert!(result.frames_count > 0);
    assert_eq!(result.frames_inpainted, result.frames_count);
    assert_eq!(inpaint.calls.load(Ordering::SeqCst), result.frames_count as usize);

    let output = Path::new(&result.output_path);
    assert!(output.exists());
    assert!(has_audio_stream(output).await.unwrap(), "audio track was dropped");

    let duration = stream_duration(output).await.unwrap();
    assert!(
        (duration - CLIP_SECONDS).abs() <= sampling_interval.max(1.0),
        "output lasts {:.2}s, input {:.2}s",
        duration,
        CLIP_SECONDS
    );

    let report = pipeline.cleanup(&result.job_id).await.unwrap();
    assert_eq!(report.outputs_removed.len(), 1);
    assert!(!output.exists());
}
