//! Application state.

use std::sync::Arc;

use tracing::info;

use shortly_queue::{JobQueue, JobReceiver, JobTracker};
use shortly_store::{MirroredStore, PersistentStore, ResultStore};
use shortly_worker::{Summarizer, SummaryPipeline, WorkerConfig, WorkflowClient, YoutubeScraper};

use crate::config::{ApiConfig, DispatchMode};
use crate::error::ApiResult;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn ResultStore>,
    pub pipeline: Arc<SummaryPipeline>,
    /// Present only in queued dispatch mode
    pub queue: Option<JobQueue>,
    pub tracker: JobTracker,
    pub workflow: WorkflowClient,
}

impl AppState {
    /// Create state with the store configured from the environment.
    ///
    /// Returns the job receiver when dispatch is queued; the caller owns the
    /// executor that drains it.
    pub async fn new(
        config: ApiConfig,
        worker_config: &WorkerConfig,
    ) -> ApiResult<(Self, Option<JobReceiver>)> {
        let mirror = PersistentStore::from_env()?;
        if let Some(mirror) = &mirror {
            info!(table = mirror.table(), "Persistent summary mirror enabled");
        }
        let store: Arc<dyn ResultStore> = Arc::new(MirroredStore::new(mirror));

        Self::build(config, worker_config, store)
    }

    /// Create state around an explicit store.
    pub fn build(
        config: ApiConfig,
        worker_config: &WorkerConfig,
        store: Arc<dyn ResultStore>,
    ) -> ApiResult<(Self, Option<JobReceiver>)> {
        let scraper = YoutubeScraper::new(worker_config)?;
        let summarizer = Summarizer::new(worker_config)?;
        let pipeline = Arc::new(SummaryPipeline::new(
            Arc::new(scraper),
            summarizer,
            Arc::clone(&store),
        ));
        let workflow = WorkflowClient::new(worker_config)?;

        let (queue, receiver) = match config.dispatch {
            DispatchMode::Queued => {
                let (queue, receiver) = JobQueue::from_env();
                (Some(queue), Some(receiver))
            }
            _ => (None, None),
        };

        let state = Self {
            config,
            store,
            pipeline,
            queue,
            tracker: JobTracker::from_env(),
            workflow,
        };

        Ok((state, receiver))
    }
}
