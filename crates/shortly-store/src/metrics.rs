//! Store metrics collection.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total table API requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "shortly_store_requests_total";

    /// Table API latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "shortly_store_latency_seconds";

    /// Mirror writes that failed and were swallowed.
    pub const MIRROR_FAILURES_TOTAL: &str = "shortly_store_mirror_failures_total";
}

/// Record metrics for a completed table API request.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record a swallowed mirror failure.
pub fn record_mirror_failure(operation: &str) {
    counter!(
        names::MIRROR_FAILURES_TOTAL,
        "operation" => operation.to_string()
    )
    .increment(1);
}
