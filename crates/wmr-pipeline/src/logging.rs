//! Job-scoped structured logging.

use tracing::{error, info, info_span, warn, Span};
use wmr_models::{DetectionOutcome, FrameStats, JobId, JobState};

/// Emits every event of one job with the same `job_id` and `operation`.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: JobId,
    operation: &'static str,
}

impl JobLogger {
    pub fn new(job_id: &JobId, operation: &'static str) -> Self {
        Self {
            job_id: job_id.clone(),
            operation,
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Span that run-level futures are instrumented with.
    pub fn span(&self) -> Span {
        info_span!("job", job_id = %self.job_id, operation = self.operation)
    }

    pub fn started(&self, detail: &str) {
        info!(job_id = %self.job_id, operation = self.operation, "Job started: {}", detail);
    }

    pub fn stage(&self, detail: &str) {
        info!(job_id = %self.job_id, operation = self.operation, "{}", detail);
    }

    pub fn transitioned(&self, from: JobState, to: JobState) {
        info!(
            job_id = %self.job_id,
            operation = self.operation,
            from = from.as_str(),
            to = to.as_str(),
            "Job state changed"
        );
    }

    pub fn detection(&self, outcome: &DetectionOutcome) {
        match outcome {
            DetectionOutcome::Error { reason } => warn!(
                job_id = %self.job_id,
                operation = self.operation,
                reason = %reason,
                "Detector unavailable, frames will be copied"
            ),
            other => info!(
                job_id = %self.job_id,
                operation = self.operation,
                outcome = other.as_str(),
                region = ?other.region(),
                "Watermark detection finished"
            ),
        }
    }

    pub fn frames(&self, stats: &FrameStats) {
        if stats.passed_through > 0 {
            warn!(
                job_id = %self.job_id,
                operation = self.operation,
                copied = stats.copied,
                inpainted = stats.inpainted,
                passed_through = stats.passed_through,
                "Some frames passed through without inpainting"
            );
        } else {
            info!(
                job_id = %self.job_id,
                operation = self.operation,
                copied = stats.copied,
                inpainted = stats.inpainted,
                "Frames processed"
            );
        }
    }

    pub fn warning(&self, detail: &str) {
        warn!(job_id = %self.job_id, operation = self.operation, "{}", detail);
    }

    pub fn failed(&self, kind: &str, detail: &str) {
        error!(
            job_id = %self.job_id,
            operation = self.operation,
            error_kind = kind,
            "Job failed: {}", detail
        );
    }

    pub fn finished(&self, detail: &str) {
        info!(job_id = %self.job_id, operation = self.operation, "Job finished: {}", detail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_keeps_job_fields() {
        let job_id = JobId::new();
        let logger = JobLogger::new(&job_id, "process_video");

        assert_eq!(logger.job_id(), &job_id);
        assert_eq!(logger.operation(), "process_video");
        assert_eq!(logger.clone().job_id(), &job_id);
    }

    #[test]
    fn test_logging_without_subscriber_is_silent() {
        let logger = JobLogger::new(&JobId::new(), "extract_frames");
        let _guard = logger.span().entered();
        logger.detection(&DetectionOutcome::error("timeout"));
        logger.frames(&FrameStats::default());
        logger.transitioned(JobState::Created, JobState::FramesExtracted);
    }
}
