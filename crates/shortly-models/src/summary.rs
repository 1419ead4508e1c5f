//! Summary records held by the result store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary text stored when the completion API answers without usable content.
pub const SUMMARY_FALLBACK: &str = "요약 실패";

/// Lifecycle status of a summary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    /// Requested but not yet summarized
    #[default]
    Pending,
    /// Summary text is available
    Done,
}

impl SummaryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryStatus::Pending => "pending",
            SummaryStatus::Done => "done",
        }
    }
}

/// A summary keyed by the exact URL string the caller submitted.
///
/// The URL is never normalized: `watch?v=X` and `watch?v=X&t=5s` are two
/// different records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub source_url: String,
    pub summary_text: String,
    pub created_at: DateTime<Utc>,
    pub status: SummaryStatus,
}

impl SummaryRecord {
    /// A finished summary stamped with the current time.
    pub fn done(source_url: impl Into<String>, summary_text: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            summary_text: summary_text.into(),
            created_at: Utc::now(),
            status: SummaryStatus::Done,
        }
    }

    /// Whether the record carries a usable summary.
    pub fn is_done(&self) -> bool {
        self.status == SummaryStatus::Done && !self.summary_text.trim().is_empty()
    }
}
