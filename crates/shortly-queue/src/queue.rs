//! Bounded in-process job queue.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{QueueError, QueueResult};
use crate::job::SummarizeJob;

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Max jobs waiting for a worker slot
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            capacity: std::env::var("QUEUE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(256),
        }
    }
}

/// Producer side of the job queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct JobQueue {
    sender: mpsc::Sender<SummarizeJob>,
    capacity: usize,
}

/// Consumer side of the job queue, owned by the executor.
#[derive(Debug)]
pub struct JobReceiver {
    receiver: mpsc::Receiver<SummarizeJob>,
}

impl JobQueue {
    /// Create a queue and its single consumer.
    pub fn new(config: QueueConfig) -> (Self, JobReceiver) {
        let (sender, receiver) = mpsc::channel(config.capacity);
        (
            Self {
                sender,
                capacity: config.capacity,
            },
            JobReceiver { receiver },
        )
    }

    /// Create from environment variables.
    pub fn from_env() -> (Self, JobReceiver) {
        Self::new(QueueConfig::from_env())
    }

    /// Enqueue a job without waiting. Fails fast when the queue is full.
    pub fn enqueue(&self, job: SummarizeJob) -> QueueResult<()> {
        let job_id = job.job_id.clone();
        match self.sender.try_send(job) {
            Ok(()) => {
                debug!(job_id = %job_id, "Enqueued summarize job");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(job_id = %job_id, capacity = self.capacity, "Job queue full");
                Err(QueueError::QueueFull(self.capacity))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(QueueError::Closed),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Jobs currently waiting.
    pub fn len(&self) -> usize {
        self.capacity - self.sender.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl JobReceiver {
    /// Wait for the next job. `None` once every producer is dropped.
    pub async fn recv(&mut self) -> Option<SummarizeJob> {
        self.receiver.recv().await
    }

    /// Stop accepting new jobs; already-queued jobs can still be drained.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}
