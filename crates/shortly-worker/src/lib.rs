//! Summary pipeline for the Shortly service.
//!
//! This crate provides:
//! - Video metadata scraping behind the [`MetadataSource`] trait
//! - Best-effort caption retrieval
//! - The chat-completion [`Summarizer`]
//! - The external workflow webhook client
//! - [`SummaryPipeline`], the per-request trigger state machine
//! - [`JobExecutor`], which drains the in-process job queue

pub mod captions;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod metadata;
pub mod metrics;
pub mod pipeline;
pub mod summarizer;
pub mod webhook;

pub use captions::{CaptionTrack, Captions};
pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::JobExecutor;
pub use logging::JobLogger;
pub use metadata::{MetadataSource, VideoPage, YoutubeScraper};
pub use pipeline::{PipelineStage, SummaryOutcome, SummaryPipeline};
pub use summarizer::Summarizer;
pub use webhook::WorkflowClient;
