//! Shared data models for the Shortly backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video ID extraction and thumbnail URLs
//! - Video metadata and caption lines
//! - Summary records kept by the result store
//! - Job identifiers and states for queued summaries
//! - HTTP request/response schemas shared by server and client

pub mod api;
pub mod job;
pub mod summary;
pub mod utils;
pub mod video;

// Re-export common types
pub use api::{
    CallbackRequest, CallbackResponse, JobStatusResponse, ResultResponse, ServiceInfoResponse,
    TriggerRequest, TriggerResponse, VideoInfoResponse,
};
pub use job::{JobId, JobState};
pub use summary::{SummaryRecord, SummaryStatus, SUMMARY_FALLBACK};
pub use utils::{extract_video_id, thumbnail_urls, watch_url};
pub use video::{CaptionLine, Thumbnails, VideoMetadata};
