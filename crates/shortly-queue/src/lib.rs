//! In-process summary job queue.
//!
//! This crate provides:
//! - Bounded job enqueueing over a tokio channel
//! - A receiver handle consumed by the worker executor
//! - Job status tracking for `GET /api/jobs/:job_id`

pub mod error;
pub mod job;
pub mod queue;
pub mod status;

pub use error::{QueueError, QueueResult};
pub use job::SummarizeJob;
pub use queue::{JobQueue, JobReceiver, QueueConfig};
pub use status::{JobRecord, JobTracker};
