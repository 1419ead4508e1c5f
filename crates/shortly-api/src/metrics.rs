//! Prometheus metrics for the API server.

use std::sync::LazyLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex::Regex;

static UUID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").expect("valid regex")
});

static JOB_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/api/jobs/[^/]+$").expect("valid regex"));

/// Install the Prometheus recorder and return the render handle.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "shortly_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "shortly_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "shortly_http_requests_in_flight";

    // Summary flow
    pub const TRIGGERS_TOTAL: &str = "shortly_triggers_total";
    pub const RESULT_LOOKUPS_TOTAL: &str = "shortly_result_lookups_total";
    pub const CALLBACKS_TOTAL: &str = "shortly_callbacks_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "shortly_rate_limit_hits_total";
}

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

/// Record a trigger by dispatch mode and outcome (`accepted` or `failed`).
pub fn record_trigger(dispatch: &'static str, outcome: &'static str) {
    counter!(names::TRIGGERS_TOTAL, "dispatch" => dispatch, "outcome" => outcome).increment(1);
}

/// Record a result lookup (`found` or `pending`).
pub fn record_result_lookup(outcome: &'static str) {
    counter!(names::RESULT_LOOKUPS_TOTAL, "outcome" => outcome).increment(1);
}

/// Record a workflow callback (`stored` or `rejected`).
pub fn record_callback(outcome: &'static str) {
    counter!(names::CALLBACKS_TOTAL, "outcome" => outcome).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Collapse job IDs so label cardinality stays bounded.
fn sanitize_path(path: &str) -> String {
    if JOB_SEGMENT.is_match(path) {
        return "/api/jobs/:job_id".to_string();
    }
    UUID_SEGMENT.replace_all(path, ":id").into_owned()
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
