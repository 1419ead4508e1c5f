//! Structured logging for pipeline runs.

use tracing::{info, warn, Span};

use shortly_models::JobId;

use crate::pipeline::PipelineStage;

/// Logs pipeline lifecycle events with the run ID and operation attached.
///
/// Inline triggers get a fresh run ID; queued jobs reuse their job ID so log
/// lines can be matched against `GET /api/jobs/:job_id`.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    operation: &'static str,
}

impl JobLogger {
    pub fn new(job_id: &JobId, operation: &'static str) -> Self {
        Self {
            job_id: job_id.to_string(),
            operation,
        }
    }

    /// Log a state machine transition.
    pub fn log_stage(&self, stage: PipelineStage, video_url: &str) {
        info!(
            job_id = %self.job_id,
            operation = self.operation,
            stage = stage.as_str(),
            video_url = %video_url,
            "Pipeline stage: {}", stage
        );
    }

    /// Log a degraded step that did not fail the run.
    pub fn log_degraded(&self, step: &str, reason: &str) {
        warn!(
            job_id = %self.job_id,
            operation = self.operation,
            step,
            "Degraded to fallback: {}", reason
        );
    }

    pub fn log_failure(&self, stage: PipelineStage, error: &str) {
        warn!(
            job_id = %self.job_id,
            operation = self.operation,
            stage = stage.as_str(),
            "Pipeline failed: {}", error
        );
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn operation(&self) -> &str {
        self.operation
    }

    /// Span for instrumenting a whole run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "summary_run",
            job_id = %self.job_id,
            operation = self.operation
        )
    }
}
