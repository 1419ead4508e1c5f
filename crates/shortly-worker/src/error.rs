//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Metadata fetch failed: {0}")]
    MetadataFailed(String),

    #[error("Caption fetch failed: {0}")]
    CaptionsFailed(String),

    #[error("Summarization API error ({status}): {body}")]
    SummarizationApi { status: u16, body: String },

    #[error("Workflow webhook error ({status}): {body}")]
    WorkflowApi { status: u16, body: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Store error: {0}")]
    Store(#[from] shortly_store::StoreError),

    #[error("Queue error: {0}")]
    Queue(#[from] shortly_queue::QueueError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl WorkerError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn metadata_failed(msg: impl Into<String>) -> Self {
        Self::MetadataFailed(msg.into())
    }

    pub fn captions_failed(msg: impl Into<String>) -> Self {
        Self::CaptionsFailed(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    /// Upstream HTTP status carried by the error, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            WorkerError::SummarizationApi { status, .. } | WorkerError::WorkflowApi { status, .. } => {
                Some(*status)
            }
            WorkerError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the caller, not an upstream, is at fault.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, WorkerError::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarization_error_embeds_status() {
        let err = WorkerError::SummarizationApi {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "Summarization API error (429): rate limited");
        assert_eq!(err.upstream_status(), Some(429));
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn test_invalid_input() {
        let err = WorkerError::invalid_input("URL is required");
        assert!(err.is_invalid_input());
        assert_eq!(err.upstream_status(), None);
    }
}
