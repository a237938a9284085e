//! Prometheus metrics for the API server.

use std::sync::LazyLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex::Regex;

/// Install the Prometheus recorder and return the render handle.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "talent_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "talent_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "talent_http_requests_in_flight";
    pub const RATE_LIMIT_HITS_TOTAL: &str = "talent_rate_limit_hits_total";
    pub const UPLOADS_TOTAL: &str = "talent_uploads_total";
    pub const UPLOAD_BYTES: &str = "talent_upload_bytes";
    pub const AUDIT_LOG_FAILURES_TOTAL: &str = "talent_audit_log_failures_total";
}

static UUID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/[0-9a-f]{8}-?[0-9a-f]{4}-?[0-9a-f]{4}-?[0-9a-f]{4}-?[0-9a-f]{12}(/|$)")
        .expect("valid uuid regex")
});

static ID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(jobs|matched|interviews|update-basic-info|candidate)/([^/]+)").expect("valid id regex")
});

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

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", sanitize_path(endpoint))];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Record a stored upload by destination folder.
pub fn record_upload(folder: &'static str, bytes: usize) {
    counter!(names::UPLOADS_TOTAL, "folder" => folder).increment(1);
    histogram!(names::UPLOAD_BYTES, "folder" => folder).record(bytes as f64);
}

pub fn record_audit_log_failure() {
    counter!(names::AUDIT_LOG_FAILURES_TOTAL).increment(1);
}

/// Sanitize path for metrics labels (collapse document ids).
fn sanitize_path(path: &str) -> String {
    let path = UUID_SEGMENT.replace_all(path, "/:id$1");
    let path = ID_SEGMENT.replace(&path, |caps: &regex::Captures| {
        let resource = &caps[1];
        let id = &caps[2];
        // Fixed sub-routes of /candidate stay as they are.
        if resource == "candidate" && matches!(id, "upload-resume" | "resume-url" | "job-matches") {
            format!("/{resource}/{id}")
        } else {
            format!("/{resource}/:id")
        }
    });
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/jobs/0f8e2c1d9b7a4e55a1c2d3e4f5a6b7c8"), "/jobs/:id");
        assert_eq!(sanitize_path("/matched/Xy12AbC/status"), "/matched/:id/status");
        assert_eq!(sanitize_path("/candidate/uid-42/skills"), "/candidate/:id/skills");
        assert_eq!(sanitize_path("/candidate/job-matches"), "/candidate/job-matches");
        assert_eq!(
            sanitize_path("/files/550e8400-e29b-41d4-a716-446655440000"),
            "/files/:id"
        );
        assert_eq!(sanitize_path("/health"), "/health");
    }
}
