//! Prometheus metrics for the API server.

use std::sync::LazyLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex_lite::Regex;

/// Install the Prometheus recorder and return its render handle.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "wmr_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "wmr_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "wmr_http_requests_in_flight";
}

/// Routes recorded under their own path.
const STATIC_ROUTES: &[&str] = &[
    "/detect-watermark",
    "/remove-watermark",
    "/extract-frames",
    "/process-video",
    "/health",
    "/ready",
    "/metrics",
];

/// Label for every path no route serves.
const UNMATCHED_PATH: &str = "/unmatched";

static JOB_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(download|cleanup)/[^/]+$").expect("valid job path pattern"));

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Collapse job ids and unknown paths so label cardinality stays bounded.
fn sanitize_path(path: &str) -> String {
    if STATIC_ROUTES.contains(&path) {
        path.to_string()
    } else if JOB_PATH.is_match(path) {
        JOB_PATH.replace(path, "/$1/:job_id").to_string()
    } else {
        UNMATCHED_PATH.to_string()
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path("/download/550e8400-e29b-41d4-a716-446655440000"),
            "/download/:job_id"
        );
        assert_eq!(sanitize_path("/cleanup/job_01"), "/cleanup/:job_id");
        assert_eq!(sanitize_path("/process-video"), "/process-video");
        assert_eq!(sanitize_path("/metrics"), "/metrics");
    }

    #[test]
    fn test_sanitize_path_unmatched() {
        for path in ["/wp-admin/setup.php", "/", "/download", "/download/a/b", "/process-video/x"] {
            assert_eq!(sanitize_path(path), "/unmatched", "{}", path);
        }
    }
}
