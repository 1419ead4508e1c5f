//! Queue error types.

use thiserror::Error;

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue is full (capacity {0})")]
    QueueFull(usize),

    #[error("Queue is closed")]
    Closed,

    #[error("Job not found: {0}")]
    JobNotFound(String),
}

impl QueueError {
    pub fn job_not_found(id: impl Into<String>) -> Self {
        Self::JobNotFound(id.into())
    }
}
