//! Job types for the queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shortly_models::JobId;

/// Job to summarize one video URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeJob {
    /// Unique job ID
    pub job_id: JobId,
    /// Video URL exactly as submitted; also the result key
    pub video_url: String,
    /// When the job was created
    pub created_at: DateTime<Utc>,
}

impl SummarizeJob {
    pub fn new(video_url: impl Into<String>) -> Self {
        Self {
            job_id: JobId::new(),
            video_url: video_url.into(),
            created_at: Utc::now(),
        }
    }
}
