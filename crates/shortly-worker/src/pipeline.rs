//! Summary pipeline.
//!
//! One run per trigger: validate the URL, gather content (best effort),
//! request a summary, write the store exactly once. Runs move through
//! [`PipelineStage`] in order and every transition is logged. A failure ends
//! the run with nothing written; there is no resumption.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use shortly_models::{extract_video_id, JobId, SummaryRecord, VideoMetadata};
use shortly_store::ResultStore;

use crate::captions::{select_track, Captions};
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::metadata::MetadataSource;
use crate::metrics::{record_degraded_fetch, record_pipeline_run};
use crate::summarizer::Summarizer;

const NOT_AVAILABLE: &str = "정보 없음";

/// Trigger state machine stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Validating,
    FetchingMetadata,
    Summarizing,
    Storing,
    Responded,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Received => "received",
            PipelineStage::Validating => "validating",
            PipelineStage::FetchingMetadata => "fetching_metadata",
            PipelineStage::Summarizing => "summarizing",
            PipelineStage::Storing => "storing",
            PipelineStage::Responded => "responded",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub video_url: String,
    pub video_id: Option<String>,
    pub summary: String,
    /// Metadata could not be fetched and URL-only content was summarized
    pub degraded: bool,
}

/// Content handed to the summarizer.
#[derive(Debug, Clone)]
struct GatheredContent {
    text: String,
    video_id: Option<String>,
    degraded: bool,
}

pub struct SummaryPipeline {
    metadata: Arc<dyn MetadataSource>,
    summarizer: Summarizer,
    store: Arc<dyn ResultStore>,
}

impl SummaryPipeline {
    pub fn new(
        metadata: Arc<dyn MetadataSource>,
        summarizer: Summarizer,
        store: Arc<dyn ResultStore>,
    ) -> Self {
        Self {
            metadata,
            summarizer,
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn ResultStore> {
        &self.store
    }

    pub fn metadata_source(&self) -> &Arc<dyn MetadataSource> {
        &self.metadata
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    /// Run inside a request with a fresh run ID.
    pub async fn run(&self, video_url: &str) -> WorkerResult<SummaryOutcome> {
        self.run_as(&JobId::new(), "inline_summary", video_url).await
    }

    /// Run under an existing job ID (queued dispatch).
    pub async fn run_as(
        &self,
        job_id: &JobId,
        operation: &'static str,
        video_url: &str,
    ) -> WorkerResult<SummaryOutcome> {
        let logger = JobLogger::new(job_id, operation);
        let span = logger.create_span();
        let start = Instant::now();

        let result = self.execute(&logger, video_url).instrument(span).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) if e.is_invalid_input() => "invalid_input",
            Err(WorkerError::SummarizationApi { .. }) => "upstream_error",
            Err(_) => "error",
        };
        record_pipeline_run(outcome, start.elapsed().as_secs_f64());

        result
    }

    async fn execute(&self, logger: &JobLogger, video_url: &str) -> WorkerResult<SummaryOutcome> {
        logger.log_stage(PipelineStage::Received, video_url);

        logger.log_stage(PipelineStage::Validating, video_url);
        if video_url.trim().is_empty() {
            let err = WorkerError::invalid_input("A video URL is required");
            logger.log_failure(PipelineStage::Validating, &err.to_string());
            return Err(err);
        }

        logger.log_stage(PipelineStage::FetchingMetadata, video_url);
        let content = self.gather_content(logger, video_url).await;

        logger.log_stage(PipelineStage::Summarizing, video_url);
        let summary = match self.summarizer.summarize(&content.text).await {
            Ok(summary) => summary,
            Err(e) => {
                logger.log_failure(PipelineStage::Summarizing, &e.to_string());
                return Err(e);
            }
        };

        logger.log_stage(PipelineStage::Storing, video_url);
        if let Err(e) = self.store.put(SummaryRecord::done(video_url, summary.clone())).await {
            logger.log_failure(PipelineStage::Storing, &e.to_string());
            return Err(e.into());
        }

        logger.log_stage(PipelineStage::Responded, video_url);
        Ok(SummaryOutcome {
            video_url: video_url.to_string(),
            video_id: content.video_id,
            summary,
            degraded: content.degraded,
        })
    }

    /// Build summarizer input. Never fails; upstream problems degrade to
    /// URL-only content.
    async fn gather_content(&self, logger: &JobLogger, video_url: &str) -> GatheredContent {
        let Some(video_id) = extract_video_id(video_url) else {
            logger.log_degraded("video_id", "no recognizable video identifier");
            record_degraded_fetch("video_id");
            return GatheredContent {
                text: fallback_content(video_url),
                video_id: None,
                degraded: true,
            };
        };

        let page = match self.metadata.fetch(&video_id).await {
            Ok(page) => page,
            Err(e) => {
                logger.log_degraded("metadata", &e.to_string());
                record_degraded_fetch("metadata");
                return GatheredContent {
                    text: fallback_content(video_url),
                    video_id: Some(video_id),
                    degraded: true,
                };
            }
        };

        let captions = match select_track(&page.caption_tracks) {
            Some(track) => match self.metadata.fetch_captions(track).await {
                Ok(lines) => Captions::Lines(lines),
                Err(e) => {
                    logger.log_degraded("captions", &e.to_string());
                    record_degraded_fetch("captions");
                    Captions::unavailable()
                }
            },
            None => Captions::unavailable(),
        };

        GatheredContent {
            text: render_content(&page.metadata, &captions),
            video_id: Some(video_id),
            degraded: false,
        }
    }
}

/// Minimal content block built only from the submitted URL.
pub fn fallback_content(video_url: &str) -> String {
    format!(
        "영상 URL: {}\n영상 정보를 가져올 수 없어 URL만 제공됩니다. 이 영상의 내용을 추정하여 요약해주세요.",
        video_url
    )
}

/// Plain-text content: metadata fields followed by caption lines.
pub fn render_content(metadata: &VideoMetadata, captions: &Captions) -> String {
    let or_na = |field: Option<&str>| field.unwrap_or(NOT_AVAILABLE).to_string();

    let mut sections = vec![
        format!("제목: {}", or_na(metadata.title.as_deref())),
        format!("채널: {}", or_na(metadata.channel_name.as_deref())),
        format!("길이: {}", or_na(metadata.formatted_duration().as_deref())),
        format!("업로드: {}", or_na(metadata.upload_date.as_deref())),
        format!("설명: {}", or_na(metadata.description.as_deref())),
    ];
    sections.push(format!("자막:\n{}", captions.render()));
    sections.join("\n")
}
