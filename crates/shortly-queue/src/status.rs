//! Job status tracking.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use shortly_models::{JobId, JobState, JobStatusResponse};

use crate::error::{QueueError, QueueResult};
use crate::job::SummarizeJob;

/// Last known state of a job.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub job_id: JobId,
    pub video_url: String,
    pub state: JobState,
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<JobRecord> for JobStatusResponse {
    fn from(record: JobRecord) -> Self {
        Self {
            job_id: record.job_id,
            video_url: record.video_url,
            state: record.state,
            error: record.error,
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// Finished jobs stay visible this long.
const DEFAULT_RETENTION: Duration = Duration::from_secs(3600);

/// Upper bound on tracked jobs.
const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Shared map from job ID to its status. Cheap to clone.
///
/// Terminal states are never overwritten. Finished records are pruned once
/// they are older than the retention window, and the oldest finished records
/// are evicted when the map is full.
#[derive(Debug, Clone)]
pub struct JobTracker {
    jobs: Arc<RwLock<HashMap<JobId, JobRecord>>>,
    retention: Duration,
    max_entries: usize,
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETENTION, DEFAULT_MAX_ENTRIES)
    }
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: Duration, max_entries: usize) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            retention,
            max_entries: max_entries.max(1),
        }
    }

    /// Create from `JOB_RETENTION_SECS` and `JOB_TRACKER_MAX_ENTRIES`.
    pub fn from_env() -> Self {
        let retention = std::env::var("JOB_RETENTION_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RETENTION);
        let max_entries = std::env::var("JOB_TRACKER_MAX_ENTRIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_ENTRIES);

        Self::with_retention(retention, max_entries)
    }

    /// Register a freshly enqueued job as `queued`.
    pub async fn track(&self, job: &SummarizeJob) {
        let record = JobRecord {
            job_id: job.job_id.clone(),
            video_url: job.video_url.clone(),
            state: JobState::Queued,
            error: None,
            updated_at: Utc::now(),
        };
        let mut jobs = self.jobs.write().await;
        self.prune(&mut jobs, Utc::now());
        jobs.insert(job.job_id.clone(), record);
    }

    /// Drop finished records past the retention window.
    pub async fn prune_expired(&self) -> usize {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        self.prune(&mut jobs, Utc::now());
        before - jobs.len()
    }

    fn prune(&self, jobs: &mut HashMap<JobId, JobRecord>, now: DateTime<Utc>) {
        let retention = chrono::Duration::from_std(self.retention).unwrap_or(chrono::Duration::MAX);
        jobs.retain(|_, r| !r.state.is_terminal() || now - r.updated_at < retention);

        if jobs.len() < self.max_entries {
            return;
        }

        let mut finished: Vec<_> = jobs
            .values()
            .filter(|r| r.state.is_terminal())
            .map(|r| (r.job_id.clone(), r.updated_at))
            .collect();
        finished.sort_by_key(|(_, t)| *t);

        let to_remove = (jobs.len() + 1 - self.max_entries).min(finished.len());
        for (job_id, _) in finished.into_iter().take(to_remove) {
            jobs.remove(&job_id);
        }
        if to_remove > 0 {
            warn!(removed = to_remove, "Job tracker full, evicted oldest finished jobs");
        }
    }

    pub async fn mark_processing(&self, job_id: &JobId) -> QueueResult<()> {
        self.transition(job_id, JobState::Processing, None).await
    }

    pub async fn mark_completed(&self, job_id: &JobId) -> QueueResult<()> {
        self.transition(job_id, JobState::Completed, None).await
    }

    pub async fn mark_failed(&self, job_id: &JobId, error: impl Into<String>) -> QueueResult<()> {
        self.transition(job_id, JobState::Failed, Some(error.into())).await
    }

    pub async fn get(&self, job_id: &JobId) -> Option<JobRecord> {
        self.jobs.read().await.get(job_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn transition(
        &self,
        job_id: &JobId,
        state: JobState,
        error: Option<String>,
    ) -> QueueResult<()> {
        let mut jobs = self.jobs.write().await;
        let record = jobs
            .get_mut(job_id)
            .ok_or_else(|| QueueError::job_not_found(job_id.as_str()))?;

        if record.state.is_terminal() {
            debug!(job_id = %job_id, state = %record.state, "Ignoring transition of finished job");
            return Ok(());
        }

        record.state = state;
        record.error = error;
        record.updated_at = Utc::now();
        Ok(())
    }
}
