//! Job executor.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Semaphore};
use tracing::{debug, error, info, warn};

use shortly_queue::{JobReceiver, JobTracker, SummarizeJob};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::pipeline::SummaryPipeline;

/// Drains the in-process queue, running up to `max_concurrent_jobs`
/// pipelines at once. Jobs are attempted once; failures are recorded on the
/// tracker and not retried.
pub struct JobExecutor {
    config: WorkerConfig,
    pipeline: Arc<SummaryPipeline>,
    tracker: JobTracker,
    job_semaphore: Arc<Semaphore>,
    shutdown: watch::Sender<bool>,
}

impl JobExecutor {
    pub fn new(config: WorkerConfig, pipeline: Arc<SummaryPipeline>, tracker: JobTracker) -> Self {
        let job_semaphore = Arc::new(Semaphore::new(config.max_concurrent_jobs));
        let (shutdown, _) = watch::channel(false);

        Self {
            config,
            pipeline,
            tracker,
            job_semaphore,
            shutdown,
        }
    }

    /// Consume jobs until shutdown is signalled or every producer is gone.
    pub async fn run(&self, mut receiver: JobReceiver) -> WorkerResult<()> {
        info!(
            max_jobs = self.config.max_concurrent_jobs,
            "Starting job executor"
        );

        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            // Hold a slot before taking a job so queued jobs stay visible as `queued`.
            let permit = tokio::select! {
                _ = shutdown_rx.changed() => continue,
                permit = Arc::clone(&self.job_semaphore).acquire_owned() => {
                    permit.map_err(|_| WorkerError::job_failed("Semaphore closed"))?
                }
            };

            let job = tokio::select! {
                _ = shutdown_rx.changed() => continue,
                job = receiver.recv() => job,
            };

            let Some(job) = job else {
                info!("Job queue closed, stopping executor");
                break;
            };

            debug!(job_id = %job.job_id, "Dequeued job");
            let pipeline = Arc::clone(&self.pipeline);
            let tracker = self.tracker.clone();
            tokio::spawn(async move {
                let _permit = permit;
                Self::execute_job(pipeline, tracker, job).await;
            });
        }

        receiver.close();

        info!("Waiting for in-flight jobs to complete...");
        if tokio::time::timeout(self.config.shutdown_timeout, self.wait_for_jobs())
            .await
            .is_err()
        {
            warn!("Timed out waiting for in-flight jobs");
        }

        info!("Job executor stopped");
        Ok(())
    }

    async fn execute_job(pipeline: Arc<SummaryPipeline>, tracker: JobTracker, job: SummarizeJob) {
        let job_id = job.job_id.clone();
        info!(job_id = %job_id, video_url = %job.video_url, "Executing job");

        if let Err(e) = tracker.mark_processing(&job_id).await {
            warn!(job_id = %job_id, error = %e, "Job was not tracked");
        }

        let update = match pipeline.run_as(&job_id, "queued_summary", &job.video_url).await {
            Ok(outcome) => {
                info!(job_id = %job_id, degraded = outcome.degraded, "Job completed successfully");
                tracker.mark_completed(&job_id).await
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "Job failed");
                tracker.mark_failed(&job_id, e.to_string()).await
            }
        };

        if let Err(e) = update {
            warn!(job_id = %job_id, error = %e, "Failed to update job status");
        }
    }

    async fn wait_for_jobs(&self) {
        loop {
            if self.job_semaphore.available_permits() == self.config.max_concurrent_jobs {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Signal shutdown.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}
