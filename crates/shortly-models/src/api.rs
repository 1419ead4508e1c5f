//! HTTP request/response schemas.
//!
//! Shared by the API server and the polling client so both sides agree on the
//! JSON shape. Field names are camelCase on the wire.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::job::{JobId, JobState};
use crate::video::VideoMetadata;

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Body of `POST /api/trigger-summarize`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerRequest {
    /// Video URL exactly as the user typed it. Missing is treated as empty.
    #[serde(default)]
    pub url: String,
}

/// Response of `POST /api/trigger-summarize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Present when the request was handed to the job queue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    pub timestamp: String,
}

impl TriggerResponse {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
            job_id: None,
            timestamp: now_rfc3339(),
        }
    }

    pub fn queued(message: impl Into<String>, job_id: JobId) -> Self {
        Self {
            job_id: Some(job_id),
            ..Self::accepted(message)
        }
    }
}

/// Response of `GET /api/summarize?url=`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ResultResponse {
    pub fn found(video_url: impl Into<String>, summary: impl Into<String>, timestamp: String) -> Self {
        Self {
            success: true,
            summary: Some(summary.into()),
            video_url: Some(video_url.into()),
            timestamp: Some(timestamp),
            message: None,
            status: Some("done".to_string()),
        }
    }

    pub fn pending(video_url: impl Into<String>) -> Self {
        Self {
            success: false,
            summary: None,
            video_url: Some(video_url.into()),
            timestamp: None,
            message: Some("not processed yet".to_string()),
            status: Some("pending".to_string()),
        }
    }

    /// Rejected lookup (missing or blank `url`).
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            success: false,
            summary: None,
            video_url: None,
            timestamp: None,
            message: Some(message.into()),
            status: None,
        }
    }

    /// The summary text, if this response carries a non-empty one.
    pub fn ready_summary(&self) -> Option<&str> {
        if !self.success {
            return None;
        }
        self.summary.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Body of `POST /api/summarize`, sent by the external workflow when done.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub summary: String,
}

/// Response of `POST /api/summarize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackResponse {
    pub success: bool,
    pub timestamp: String,
}

impl CallbackResponse {
    pub fn stored() -> Self {
        Self {
            success: true,
            timestamp: now_rfc3339(),
        }
    }
}

/// Response of `GET /api/video-info?url=`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfoResponse {
    pub success: bool,
    #[serde(flatten)]
    pub metadata: Option<VideoMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VideoInfoResponse {
    pub fn found(metadata: VideoMetadata) -> Self {
        Self {
            success: true,
            metadata: Some(metadata),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            metadata: None,
            message: Some(message.into()),
        }
    }
}

/// Response of `GET /api/trigger-summarize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfoResponse {
    pub message: String,
    pub version: String,
    pub status: String,
    pub dispatch: String,
    pub stored_results: usize,
    pub openai_key_exists: bool,
}

/// Response of `GET /api/jobs/:job_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub job_id: JobId,
    pub video_url: String,
    pub state: JobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_request_missing_url_defaults_empty() {
        let req: TriggerRequest = serde_json::from_str("{}").unwrap();
        assert!(req.url.is_empty());
    }

    #[test]
    fn test_trigger_response_shape() {
        let json = serde_json::to_value(TriggerResponse::queued("ok", JobId::from_string("j1"))).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["jobId"], "j1");
        assert!(json.get("error").is_none());
        assert!(json["timestamp"].is_string());

        let json = serde_json::to_value(TriggerResponse::accepted("ok")).unwrap();
        assert!(json.get("jobId").is_none());
    }

    #[test]
    fn test_result_response_ready_summary() {
        let found = ResultResponse::found("u", "text", "t".to_string());
        assert_eq!(found.ready_summary(), Some("text"));

        let blank = ResultResponse::found("u", "  ", "t".to_string());
        assert_eq!(blank.ready_summary(), None);

        let pending = ResultResponse::pending("u");
        assert_eq!(pending.ready_summary(), None);
        assert_eq!(pending.status.as_deref(), Some("pending"));
    }

    #[test]
    fn test_video_info_response_flattens_metadata() {
        let mut meta = VideoMetadata::new("dQw4w9WgXcQ");
        meta.title = Some("Never Gonna Give You Up".to_string());

        let json = serde_json::to_value(VideoInfoResponse::found(meta)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["videoId"], "dQw4w9WgXcQ");
        assert_eq!(json["title"], "Never Gonna Give You Up");
        assert!(json["thumbnails"]["maxres"].is_string());

        let json = serde_json::to_value(VideoInfoResponse::failed("bad url")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "bad url");
        assert!(json.get("videoId").is_none());
    }
}
