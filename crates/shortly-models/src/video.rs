//! Video metadata models.
//!
//! Metadata is derived fresh for every summary request and never persisted.
//! Each scalar field is optional: scraping is best effort and a missing
//! pattern simply leaves the field empty.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Thumbnail URL set for a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnails {
    pub default: String,
    pub medium: String,
    pub high: String,
    pub standard: String,
    pub maxres: String,
}

/// One timestamped caption line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionLine {
    /// Offset from the start of the video, in seconds
    pub start_seconds: f64,
    /// Caption text with markup and entities decoded
    pub text: String,
}

impl CaptionLine {
    pub fn new(start_seconds: f64, text: impl Into<String>) -> Self {
        Self {
            start_seconds,
            text: text.into(),
        }
    }

    /// Timestamp rendered as `mm:ss` (minutes keep growing past an hour).
    pub fn timestamp(&self) -> String {
        let total = self.start_seconds.max(0.0).floor() as u64;
        format!("{:02}:{:02}", total / 60, total % 60)
    }
}

impl fmt::Display for CaptionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp(), self.text)
    }
}

/// Metadata scraped for a single video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub video_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
    /// Duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
    pub thumbnails: Thumbnails,
}

impl VideoMetadata {
    /// Empty metadata for an identifier; only thumbnails are known up front.
    pub fn new(video_id: impl Into<String>) -> Self {
        let video_id = video_id.into();
        let thumbnails = crate::utils::thumbnail_urls(&video_id);
        Self {
            video_id,
            title: None,
            description: None,
            channel_name: None,
            duration: None,
            view_count: None,
            upload_date: None,
            thumbnails,
        }
    }

    /// Human-readable duration (`h:mm:ss` or `m:ss`).
    pub fn formatted_duration(&self) -> Option<String> {
        self.duration.map(|secs| {
            let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
            if h > 0 {
                format!("{}:{:02}:{:02}", h, m, s)
            } else {
                format!("{}:{:02}", m, s)
            }
        })
    }
}
