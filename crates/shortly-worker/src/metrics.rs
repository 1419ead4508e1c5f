//! Pipeline metrics.

use metrics::{counter, histogram};

pub mod names {
    /// Pipeline runs by outcome (`success`, `invalid_input`, `upstream_error`, `error`).
    pub const PIPELINE_RUNS_TOTAL: &str = "shortly_pipeline_runs_total";

    /// Pipeline run duration in seconds.
    pub const PIPELINE_DURATION_SECONDS: &str = "shortly_pipeline_duration_seconds";

    /// Metadata and caption fetches that fell back to degraded content.
    pub const DEGRADED_FETCHES_TOTAL: &str = "shortly_degraded_fetches_total";

    /// Completion API calls by HTTP status.
    pub const COMPLETION_REQUESTS_TOTAL: &str = "shortly_completion_requests_total";
}

pub fn record_pipeline_run(outcome: &'static str, duration_secs: f64) {
    counter!(names::PIPELINE_RUNS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(names::PIPELINE_DURATION_SECONDS, "outcome" => outcome).record(duration_secs);
}

pub fn record_degraded_fetch(step: &'static str) {
    counter!(names::DEGRADED_FETCHES_TOTAL, "step" => step).increment(1);
}

pub fn record_completion_request(status: u16) {
    counter!(names::COMPLETION_REQUESTS_TOTAL, "status" => status.to_string()).increment(1);
}
