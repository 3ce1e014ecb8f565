//! Job orchestration.
//!
//! A job owns `<temp_dir>/<job_id>`:
//!
//! ```text
//! <job_id>/
//!   frames/      frame_00001.png, frame_00002.png, ...
//!   processed/   same names, after inpainting or copying
//!   audio.mka    present when the source has an audio track
//!   output.<ext> reassembled video, moved to <output_dir>/<job_id>.<ext>
//! ```
//!
//! The directory is removed when the job ends, whether it succeeded or not.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::fs;
use tracing::{debug, info, warn, Instrument};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::inpainter::{FrameInpainter, InpaintOutcome};
use crate::locator::WatermarkLocator;
use crate::logging::JobLogger;
use crate::metrics;
use wmr_media::{
    move_file, remove_dir_if_exists, remove_file_if_exists, MediaError, ToolOutcome, Transcoder,
};
use wmr_models::encoding::AUDIO_FILE_NAME;
use wmr_models::{
    EncodingConfig, FrameOutcome, FrameStats, JobId, JobState, OutputFormat,
    ProcessVideoRequest, ProcessVideoResult, WatermarkRegion,
};

/// A single pipeline run and its state.
#[derive(Debug)]
pub struct Job {
    pub id: JobId,
    pub video: PathBuf,
    pub work_dir: PathBuf,
    pub format: OutputFormat,
    state: JobState,
    logger: JobLogger,
}

impl Job {
    pub fn new(id: JobId, video: PathBuf, work_dir: PathBuf, format: OutputFormat) -> Self {
        let logger = JobLogger::new(&id, "process_video");
        Self {
            id,
            video,
            work_dir,
            format,
            state: JobState::Created,
            logger,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Move to `next`, rejecting transitions the state machine forbids.
    pub fn transition(&mut self, next: JobState) -> PipelineResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(PipelineError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.logger.transitioned(self.state, next);
        self.state = next;
        Ok(())
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.work_dir.join("frames")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.work_dir.join("processed")
    }

    pub fn audio_path(&self) -> PathBuf {
        self.work_dir.join(AUDIO_FILE_NAME)
    }

    pub fn assembled_path(&self) -> PathBuf {
        self.work_dir
            .join(format!("output.{}", self.format.extension()))
    }
}

/// Frames left on disk by a standalone extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedFrames {
    pub job_id: JobId,
    pub frames_count: usize,
    pub frames_dir: String,
}

/// What a cleanup call removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// State the job was left in, judged from what was on disk. `None` when
    /// nothing was left for the id.
    pub previous_state: Option<JobState>,
    pub work_dir_removed: bool,
    pub outputs_removed: Vec<PathBuf>,
}

impl CleanupReport {
    pub fn removed_anything(&self) -> bool {
        self.work_dir_removed || !self.outputs_removed.is_empty()
    }
}

/// Clamp a caller-supplied region into the frame.
///
/// Non-finite and empty regions are rejected; anything else that sticks out
/// of the frame is pulled back in with a warning.
pub fn resolve_region(region: &WatermarkRegion) -> PipelineResult<WatermarkRegion> {
    let clamped = region.clamp_to_frame()?;
    if clamped.adjusted {
        warn!(
            requested = ?region,
            clamped = ?clamped.region,
            "Watermark region extends outside the frame, clamping"
        );
    }
    Ok(clamped.region)
}

/// Sequences extraction, detection, inpainting and reassembly.
#[derive(Clone)]
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    transcoder: Arc<dyn Transcoder>,
    locator: WatermarkLocator,
    inpainter: FrameInpainter,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        transcoder: Arc<dyn Transcoder>,
        locator: WatermarkLocator,
        inpainter: FrameInpainter,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transcoder,
            locator,
            inpainter,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn locator(&self) -> &WatermarkLocator {
        &self.locator
    }

    pub fn inpainter(&self) -> &FrameInpainter {
        &self.inpainter
    }

    /// Run the whole pipeline on a server-local video.
    ///
    /// On success the only artifact left is `<output_dir>/<job_id>.<ext>`. On
    /// failure nothing is left behind for the job.
    pub async fn process_video(
        &self,
        request: &ProcessVideoRequest,
    ) -> PipelineResult<ProcessVideoResult> {
        let video = PathBuf::from(&request.video_path);
        if !fs::try_exists(&video).await.unwrap_or(false) {
            return Err(PipelineError::VideoNotFound(request.video_path.clone()));
        }

        let region = request
            .watermark_area
            .as_ref()
            .map(resolve_region)
            .transpose()?;

        let job_id = JobId::new();
        let work_dir = self.config.job_dir(&job_id);
        let mut job = Job::new(job_id, video, work_dir, request.output_format);
        let logger = job.logger.clone();

        logger.started(&format!(
            "{} -> {} (detect: {}, region supplied: {})",
            request.video_path,
            job.format,
            request.detect_watermark,
            region.is_some()
        ));
        let started = Instant::now();

        let result = self
            .run_job(&mut job, region, request.detect_watermark)
            .instrument(logger.span())
            .await;

        if let Err(e) = remove_dir_if_exists(&job.work_dir).await {
            logger.warning(&format!("Failed to remove working directory: {}", e));
        }

        match result {
            Ok(result) => {
                job.transition(JobState::Done)?;
                metrics::record_job_completed(job.format.extension(), started.elapsed().as_secs_f64());
                logger.finished(&result.output_path);
                Ok(result)
            }
            Err(e) => {
                if let Err(te) = job.transition(JobState::Failed) {
                    debug!("{}", te);
                }
                let output = self.config.output_path(&job.id, job.format);
                if let Err(re) = remove_file_if_exists(&output).await {
                    logger.warning(&format!("Failed to remove partial output: {}", re));
                }
                metrics::record_job_failed(e.kind());
                logger.failed(e.kind(), &e.to_string());
                Err(e)
            }
        }
    }

    async fn run_job(
        &self,
        job: &mut Job,
        region: Option<WatermarkRegion>,
        detect: bool,
    ) -> PipelineResult<ProcessVideoResult> {
        let frames_dir = job.frames_dir();
        let processed_dir = job.processed_dir();
        fs::create_dir_all(&processed_dir).await?;

        let source_fps = self.transcoder.probe_frame_rate(&job.video).await;
        job.logger
            .stage(&format!("source frame rate {:.3} fps", source_fps));

        let audio = match self
            .transcoder
            .extract_audio(&job.video, &job.audio_path())
            .await
        {
            ToolOutcome::Produced(path) => Some(path),
            ToolOutcome::Empty { .. } => {
                job.logger.stage("no audio track, output will be silent");
                None
            }
            ToolOutcome::Failed(e) => {
                job.logger
                    .warning(&format!("audio extraction failed, continuing without audio: {}", e));
                None
            }
        };

        let fps = f64::from(self.config.extraction_fps);
        let frames = match self
            .transcoder
            .extract_frames(&job.video, &frames_dir, fps)
            .await
        {
            ToolOutcome::Produced(frames) if !frames.is_empty() => frames,
            ToolOutcome::Produced(_) | ToolOutcome::Empty { .. } => {
                return Err(PipelineError::NoFrames)
            }
            ToolOutcome::Failed(e) => return Err(e.into()),
        };
        job.transition(JobState::FramesExtracted)?;
        job.logger
            .stage(&format!("extracted {} frames at {} fps", frames.len(), fps));

        let mut detection = None;
        let region = match region {
            Some(region) => Some(region),
            None if detect => {
                job.transition(JobState::Detecting)?;
                let first = fs::read(&frames[0]).await?;
                let outcome = self.locator.detect(&first).await;
                job.logger.detection(&outcome);
                let region = outcome.region();
                detection = Some(outcome);
                region
            }
            None => None,
        };

        let mut stats = FrameStats::default();
        for src in &frames {
            let name = src.file_name().ok_or_else(|| {
                MediaError::internal(format!("frame path without a name: {}", src.display()))
            })?;
            let outcome = self
                .process_frame(src, &processed_dir.join(name), region.as_ref())
                .await?;
            metrics::record_frame(outcome.as_str());
            stats.record(&outcome);
        }
        job.transition(JobState::FramesProcessed)?;
        job.logger.frames(&stats);

        let encoding = EncodingConfig::for_format(job.format);
        let assembled = match self
            .transcoder
            .assemble(
                &processed_dir,
                &job.assembled_path(),
                fps,
                audio.as_deref(),
                &encoding,
            )
            .await
        {
            ToolOutcome::Produced(path) => path,
            empty @ ToolOutcome::Empty { .. } => {
                return Err(PipelineError::assembly_failed(format!("ffmpeg {}", empty)))
            }
            ToolOutcome::Failed(e) => return Err(e.into()),
        };

        let output = self.config.output_path(&job.id, job.format);
        move_file(&assembled, &output).await?;
        job.transition(JobState::Assembled)?;

        Ok(ProcessVideoResult {
            job_id: job.id.clone(),
            output_path: output.display().to_string(),
            frames_count: stats.total(),
            watermark_detected: region.is_some(),
            watermark_area: region,
            detection_outcome: detection,
            frames_inpainted: stats.inpainted,
            frames_passed_through: stats.passed_through,
        })
    }

    /// Produce `dst` from `src`.
    ///
    /// With a region the frame goes through the inpainter; without one it is
    /// copied byte for byte. Running it twice yields the same `dst`.
    pub async fn process_frame(
        &self,
        src: &Path,
        dst: &Path,
        region: Option<&WatermarkRegion>,
    ) -> PipelineResult<FrameOutcome> {
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent).await?;
        }

        let Some(region) = region else {
            fs::copy(src, dst).await?;
            return Ok(FrameOutcome::Copied);
        };

        let frame = fs::read(src).await?;
        let outcome = self.inpainter.remove(&frame, region).await;
        let frame_outcome = match &outcome {
            InpaintOutcome::Inpainted(_) => FrameOutcome::Inpainted,
            InpaintOutcome::PassedThrough { reason, .. } => {
                debug!(frame = %src.display(), reason = %reason, "Frame passed through");
                FrameOutcome::PassedThrough {
                    reason: reason.clone(),
                }
            }
        };
        fs::write(dst, outcome.bytes()).await?;
        Ok(frame_outcome)
    }

    /// Sample `video` into `<temp_dir>/<job_id>/frames`.
    ///
    /// The frames stay on disk until the job is cleaned up.
    pub async fn extract_frames_job(
        &self,
        job_id: &JobId,
        video: &Path,
        fps: f64,
    ) -> PipelineResult<ExtractedFrames> {
        let logger = JobLogger::new(job_id, "extract_frames");
        let frames_dir = self.config.job_dir(job_id).join("frames");
        logger.started(&format!("{} at {} fps", video.display(), fps));

        match self.transcoder.extract_frames(video, &frames_dir, fps).await {
            ToolOutcome::Produced(frames) if !frames.is_empty() => {
                logger.finished(&format!("{} frames", frames.len()));
                Ok(ExtractedFrames {
                    job_id: job_id.clone(),
                    frames_count: frames.len(),
                    frames_dir: frames_dir.display().to_string(),
                })
            }
            ToolOutcome::Produced(_) | ToolOutcome::Empty { .. } => {
                logger.failed("no_frames", "no frames extracted");
                Err(PipelineError::NoFrames)
            }
            ToolOutcome::Failed(e) => {
                logger.failed("media", &e.to_string());
                Err(e.into())
            }
        }
    }

    /// Remove the working directory and every published output of `job_id`.
    ///
    /// Safe to call repeatedly and for ids that never existed.
    pub async fn cleanup(&self, job_id: &JobId) -> PipelineResult<CleanupReport> {
        let work_dir = self.config.job_dir(job_id);
        let previous_state = if self.find_output(job_id).await.is_some() {
            Some(JobState::Done)
        } else if fs::try_exists(&work_dir).await.unwrap_or(false) {
            Some(JobState::FramesExtracted)
        } else {
            None
        };

        let work_dir_removed = remove_dir_if_exists(&work_dir).await?;

        let mut outputs_removed = Vec::new();
        for format in OutputFormat::ALL {
            let output = self.config.output_path(job_id, format);
            if remove_file_if_exists(&output).await? {
                outputs_removed.push(output);
            }
        }

        if let Some(from) = previous_state.filter(|s| s.can_transition_to(JobState::Cleaned)) {
            JobLogger::new(job_id, "cleanup").transitioned(from, JobState::Cleaned);
        }

        let report = CleanupReport {
            previous_state,
            work_dir_removed,
            outputs_removed,
        };
        info!(
            job_id = %job_id,
            work_dir_removed = report.work_dir_removed,
            outputs_removed = report.outputs_removed.len(),
            "Cleaned up job"
        );
        Ok(report)
    }

    /// Locate the published output of `job_id`, trying every known extension.
    pub async fn find_output(&self, job_id: &JobId) -> Option<(PathBuf, OutputFormat)> {
        for format in OutputFormat::ALL {
            let path = self.config.output_path(job_id, format);
            if fs::try_exists(&path).await.unwrap_or(false) {
                return Some((path, format));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;
    use wmr_media::list_frames;
    use wmr_ml_client::{InpaintModel, MlError, MlResult, VisionModel};
    use wmr_models::encoding::frame_file_name;
    use wmr_models::{DetectionOutcome, WatermarkPosition};

    fn png(shade: u8) -> Vec<u8> {
        let img = RgbImage::from_pixel(20, 10, Rgb([shade, shade, shade]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    /// Writes `frames` synthetic frames; "assembles" by concatenating the
    /// frame files in order, so the output reflects exactly what was
    /// processed.
    struct FakeTranscoder {
        frames: u32,
        with_audio: bool,
        assemble_output: bool,
        assembled_with_audio: Mutex<Option<bool>>,
    }

    impl FakeTranscoder {
        fn new(frames: u32) -> Self {
            Self {
                frames,
                with_audio: true,
                assemble_output: true,
                assembled_with_audio: Mutex::new(None),
            }
        }

        fn source_frame(index: u32) -> Vec<u8> {
            png((index * 40) as u8)
        }

        fn concat_sources(&self) -> Vec<u8> {
            (1..=self.frames).flat_map(Self::source_frame).collect()
        }
    }

    #[async_trait]
    impl Transcoder for FakeTranscoder {
        async fn probe_frame_rate(&self, _video: &Path) -> f64 {
            25.0
        }

        async fn extract_frames(
            &self,
            _video: &Path,
            out_dir: &Path,
            _fps: f64,
        ) -> ToolOutcome<Vec<PathBuf>> {
            fs::create_dir_all(out_dir).await.unwrap();
            if self.frames == 0 {
                return ToolOutcome::Empty {
                    exit_code: Some(1),
                    stderr: Some("Invalid data found when processing input".to_string()),
                };
            }
            let mut paths = Vec::new();
            for i in 1..=self.frames {
                let path = out_dir.join(frame_file_name(i));
                fs::write(&path, Self::source_frame(i)).await.unwrap();
                paths.push(path);
            }
            ToolOutcome::Produced(paths)
        }

        async fn extract_audio(&self, _video: &Path, out_path: &Path) -> ToolOutcome<PathBuf> {
            if !self.with_audio {
                return ToolOutcome::skipped();
            }
            fs::write(out_path, b"audio").await.unwrap();
            ToolOutcome::Produced(out_path.to_path_buf())
        }

        async fn assemble(
            &self,
            frames_dir: &Path,
            out_path: &Path,
            _fps: f64,
            audio: Option<&Path>,
            _encoding: &EncodingConfig,
        ) -> ToolOutcome<PathBuf> {
            *self.assembled_with_audio.lock().unwrap() = Some(audio.is_some());
            if !self.assemble_output {
                return ToolOutcome::Empty {
                    exit_code: Some(0),
                    stderr: None,
                };
            }
            let mut video = Vec::new();
            for frame in list_frames(frames_dir).await.unwrap() {
                video.extend(fs::read(frame).await.unwrap());
            }
            fs::write(out_path, video).await.unwrap();
            ToolOutcome::Produced(out_path.to_path_buf())
        }
    }

    struct FakeVision {
        answer: Option<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VisionModel for FakeVision {
        async fn describe(&self, _prompt: &str, _image: &[u8]) -> MlResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .map(str::to_string)
                .ok_or_else(|| MlError::ServiceUnavailable("refused".to_string()))
        }

        async fn health_check(&self) -> bool {
            true
        }
    }

    struct FakeInpaint {
        reachable: bool,
        masks: Mutex<Vec<Vec<u8>>>,
    }

    #[async_trait]
    impl InpaintModel for FakeInpaint {
        async fn inpaint(&self, _image_png: Vec<u8>, mask_png: Vec<u8>) -> MlResult<Vec<u8>> {
            self.masks.lock().unwrap().push(mask_png);
            if self.reachable {
                Ok(png(255))
            } else {
                Err(MlError::ServiceUnavailable("connection refused".to_string()))
            }
        }

        async fn health_check(&self) -> bool {
            self.reachable
        }
    }

    struct Harness {
        _dir: TempDir,
        video: PathBuf,
        pipeline: Pipeline,
        transcoder: Arc<FakeTranscoder>,
        vision: Arc<FakeVision>,
        inpaint: Arc<FakeInpaint>,
    }

    impl Harness {
        async fn new(
            transcoder: FakeTranscoder,
            answer: Option<&'static str>,
            reachable: bool,
        ) -> Self {
            let dir = TempDir::new().unwrap();
            let video = dir.path().join("input.mp4");
            fs::write(&video, b"not really a video").await.unwrap();

            let config = PipelineConfig::under(dir.path());
            config.ensure_dirs().await.unwrap();

            let transcoder = Arc::new(transcoder);
            let vision = Arc::new(FakeVision {
                answer,
                calls: AtomicUsize::new(0),
            });
            let inpaint = Arc::new(FakeInpaint {
                reachable,
                masks: Mutex::new(Vec::new()),
            });
            let pipeline = Pipeline::new(
                config,
                transcoder.clone(),
                WatermarkLocator::new(vision.clone()),
                FrameInpainter::new(inpaint.clone()),
            );

            Self {
                _dir: dir,
                video,
                pipeline,
                transcoder,
                vision,
                inpaint,
            }
        }

        fn request(&self) -> ProcessVideoRequest {
            ProcessVideoRequest::new(self.video.display().to_string())
        }

        async fn temp_entries(&self) -> usize {
            let mut entries = fs::read_dir(&self.pipeline.config().temp_dir).await.unwrap();
            let mut count = 0;
            while entries.next_entry().await.unwrap().is_some() {
                count += 1;
            }
            count
        }
    }

    #[tokio::test]
    async fn test_detects_once_and_reuses_region() {
        let h = Harness::new(
            FakeTranscoder::new(3),
            Some("There is a watermark in the top-left corner"),
            true,
        )
        .await;

        let result = h.pipeline.process_video(&h.request()).await.unwrap();

        assert_eq!(h.vision.calls.load(Ordering::SeqCst), 1);
        assert!(result.watermark_detected);
        assert_eq!(result.watermark_area, Some(WatermarkPosition::TopLeft.region()));
        assert_eq!(
            result.detection_outcome,
            Some(DetectionOutcome::detected(WatermarkPosition::TopLeft))
        );
        assert_eq!(result.frames_count, 3);
        assert_eq!(result.frames_inpainted, 3);

        let masks = h.inpaint.masks.lock().unwrap();
        assert_eq!(masks.len(), 3);
        assert!(masks.iter().all(|m| *m == masks[0]));

        let output = PathBuf::from(&result.output_path);
        assert_eq!(output, h.pipeline.config().output_path(&result.job_id, OutputFormat::Mp4));
        assert_eq!(fs::read(&output).await.unwrap(), png(255).repeat(3));
        assert_eq!(*h.transcoder.assembled_with_audio.lock().unwrap(), Some(true));
        assert_eq!(h.temp_entries().await, 0);
    }

    #[tokio::test]
    async fn test_no_watermark_keeps_frames_identical() {
        let h = Harness::new(
            FakeTranscoder::new(4),
            Some("No watermark detected in this clean image"),
            true,
        )
        .await;

        let result = h.pipeline.process_video(&h.request()).await.unwrap();

        assert!(!result.watermark_detected);
        assert_eq!(result.detection_outcome, Some(DetectionOutcome::NotFound));
        assert_eq!(result.frames_inpainted, 0);
        assert!(h.inpaint.masks.lock().unwrap().is_empty());
        assert_eq!(
            fs::read(&result.output_path).await.unwrap(),
            h.transcoder.concat_sources()
        );
    }

    #[tokio::test]
    async fn test_unreachable_inpainter_yields_unmodified_video() {
        let h = Harness::new(FakeTranscoder::new(3), None, false).await;
        let request = h
            .request()
            .with_region(WatermarkRegion::new(0.7, 0.85, 0.3, 0.15));

        let result = h.pipeline.process_video(&request).await.unwrap();

        assert_eq!(h.vision.calls.load(Ordering::SeqCst), 0);
        assert!(result.detection_outcome.is_none());
        assert_eq!(result.frames_passed_through, 3);
        assert_eq!(
            fs::read(&result.output_path).await.unwrap(),
            h.transcoder.concat_sources()
        );
    }

    #[tokio::test]
    async fn test_detector_error_copies_frames() {
        let h = Harness::new(FakeTranscoder::new(2), None, true).await;

        let result = h.pipeline.process_video(&h.request()).await.unwrap();

        assert_eq!(result.detection_outcome.as_ref().map(|d| d.as_str()), Some("error"));
        assert!(!result.watermark_detected);
        assert_eq!(
            fs::read(&result.output_path).await.unwrap(),
            h.transcoder.concat_sources()
        );
    }

    #[tokio::test]
    async fn test_detection_disabled() {
        let h = Harness::new(FakeTranscoder::new(2), Some("watermark top-right"), true).await;
        let request = h.request().with_detection(false).with_format(OutputFormat::Mkv);

        let result = h.pipeline.process_video(&request).await.unwrap();

        assert_eq!(h.vision.calls.load(Ordering::SeqCst), 0);
        assert!(result.output_path.ends_with(".mkv"));
        assert_eq!(result.frames_count, 2);
    }

    #[tokio::test]
    async fn test_missing_video() {
        let h = Harness::new(FakeTranscoder::new(1), None, true).await;
        let request = ProcessVideoRequest::new("/nonexistent/video.mp4");

        let err = h.pipeline.process_video(&request).await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(h.temp_entries().await, 0);
    }

    #[tokio::test]
    async fn test_no_frames_is_bad_request_and_cleans_up() {
        let h = Harness::new(FakeTranscoder::new(0), None, true).await;

        let err = h.pipeline.process_video(&h.request()).await.unwrap_err();

        assert!(matches!(err, PipelineError::NoFrames));
        assert!(err.is_bad_request());
        assert_eq!(h.temp_entries().await, 0);
    }

    #[tokio::test]
    async fn test_empty_assembly_fails_without_artifact() {
        let mut transcoder = FakeTranscoder::new(2);
        transcoder.assemble_output = false;
        transcoder.with_audio = false;
        let h = Harness::new(transcoder, Some("No watermark detected"), true).await;

        let err = h.pipeline.process_video(&h.request()).await.unwrap_err();

        assert!(matches!(err, PipelineError::AssemblyFailed(_)));
        assert!(!err.is_bad_request());
        assert_eq!(*h.transcoder.assembled_with_audio.lock().unwrap(), Some(false));
        assert_eq!(h.temp_entries().await, 0);
        let mut outputs = fs::read_dir(&h.pipeline.config().output_dir).await.unwrap();
        assert!(outputs.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_region_rejected_before_job_starts() {
        let h = Harness::new(FakeTranscoder::new(1), None, true).await;
        let request = h
            .request()
            .with_region(WatermarkRegion::new(f64::NAN, 0.0, 0.3, 0.1));

        let err = h.pipeline.process_video(&request).await.unwrap_err();

        assert!(matches!(err, PipelineError::InvalidRegion(_)));
        assert_eq!(h.temp_entries().await, 0);
    }

    #[test]
    fn test_resolve_region_clamps() {
        let region = resolve_region(&WatermarkRegion::new(0.8, 0.9, 0.5, 0.5)).unwrap();
        assert!((region.x + region.width - 1.0).abs() < 1e-9);
        assert!((region.y + region.height - 1.0).abs() < 1e-9);

        assert!(resolve_region(&WatermarkRegion::new(1.2, 0.0, 0.3, 0.1)).is_err());
    }

    #[tokio::test]
    async fn test_process_frame_is_idempotent() {
        let h = Harness::new(FakeTranscoder::new(1), None, true).await;
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("frame_00001.png");
        let dst = dir.path().join("processed").join("frame_00001.png");
        fs::write(&src, png(7)).await.unwrap();
        let region = WatermarkRegion::new(0.0, 0.0, 0.5, 0.5);

        let first = h.pipeline.process_frame(&src, &dst, Some(&region)).await.unwrap();
        let first_bytes = fs::read(&dst).await.unwrap();
        let second = h.pipeline.process_frame(&src, &dst, Some(&region)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read(&dst).await.unwrap(), first_bytes);

        let copied = h.pipeline.process_frame(&src, &dst, None).await.unwrap();
        assert_eq!(copied, FrameOutcome::Copied);
        assert_eq!(fs::read(&dst).await.unwrap(), png(7));
    }

    #[tokio::test]
    async fn test_extract_frames_job_keeps_frames() {
        let h = Harness::new(FakeTranscoder::new(5), None, true).await;
        let job_id = JobId::new();

        let extracted = h
            .pipeline
            .extract_frames_job(&job_id, &h.video, 1.0)
            .await
            .unwrap();

        assert_eq!(extracted.frames_count, 5);
        assert_eq!(list_frames(&extracted.frames_dir).await.unwrap().len(), 5);

        let report = h.pipeline.cleanup(&job_id).await.unwrap();
        assert!(report.work_dir_removed);
        assert_eq!(report.previous_state, Some(JobState::FramesExtracted));

        let again = h.pipeline.cleanup(&job_id).await.unwrap();
        assert_eq!(again.previous_state, None);
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let h = Harness::new(FakeTranscoder::new(2), None, true).await;
        let result = h.pipeline.process_video(&h.request()).await.unwrap();
        assert!(h.pipeline.find_output(&result.job_id).await.is_some());

        let first = h.pipeline.cleanup(&result.job_id).await.unwrap();
        assert_eq!(first.previous_state, Some(JobState::Done));
        assert_eq!(first.outputs_removed.len(), 1);
        assert!(h.pipeline.find_output(&result.job_id).await.is_none());

        let second = h.pipeline.cleanup(&result.job_id).await.unwrap();
        assert!(!second.removed_anything());

        let never = h.pipeline.cleanup(&JobId::new()).await.unwrap();
        assert_eq!(never, CleanupReport::default());
    }

    #[test]
    fn test_job_rejects_illegal_transition() {
        let mut job = Job::new(
            JobId::new(),
            PathBuf::from("in.mp4"),
            PathBuf::from("/tmp/job"),
            OutputFormat::Mp4,
        );
        assert!(job.transition(JobState::Assembled).is_err());
        job.transition(JobState::FramesExtracted).unwrap();
        job.transition(JobState::FramesProcessed).unwrap();
        job.transition(JobState::Failed).unwrap();
        assert!(job.transition(JobState::Done).is_err());
        assert_eq!(job.state(), JobState::Failed);
        assert_eq!(job.assembled_path(), PathBuf::from("/tmp/job/output.mp4"));
    }
}
