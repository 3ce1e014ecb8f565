//! Pipeline counters.
//!
//! Recorded through the `metrics` facade; they are no-ops until the binary
//! installs a recorder.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_COMPLETED_TOTAL: &str = "wmr_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "wmr_jobs_failed_total";
    pub const JOB_DURATION_SECONDS: &str = "wmr_job_duration_seconds";
    pub const FRAMES_TOTAL: &str = "wmr_frames_total";
    pub const DETECTIONS_TOTAL: &str = "wmr_detections_total";
}

pub fn record_job_completed(format: &str, duration_secs: f64) {
    let labels = [("format", format.to_string())];
    counter!(names::JOBS_COMPLETED_TOTAL, &labels).increment(1);
    histogram!(names::JOB_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_job_failed(reason: &str) {
    let labels = [("reason", reason.to_string())];
    counter!(names::JOBS_FAILED_TOTAL, &labels).increment(1);
}

/// `outcome` is one of `copied`, `inpainted`, `passed_through`.
pub fn record_frame(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::FRAMES_TOTAL, &labels).increment(1);
}

pub fn record_detection(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::DETECTIONS_TOTAL, &labels).increment(1);
}
