//! Recent-summary history kept in a local JSON file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ClientResult;

pub const MAX_HISTORY_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: String,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

/// Most-recent-first list, one entry per URL, at most [`MAX_HISTORY_ENTRIES`].
#[derive(Debug)]
pub struct RecentHistory {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl RecentHistory {
    /// Read the history file. A missing or unreadable file yields an empty list.
    pub async fn load(path: impl Into<PathBuf>) -> ClientResult<Self> {
        let path = path.into();

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<HistoryEntry>>(&bytes) {
                Ok(mut entries) => {
                    entries.truncate(MAX_HISTORY_ENTRIES);
                    entries
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring corrupt history file");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), count = entries.len(), "Loaded history");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Put `url` at the front, replacing any earlier entry for the same URL.
    pub fn record(&mut self, url: impl Into<String>, summary: impl Into<String>) {
        let url = url.into();
        self.entries.retain(|e| e.url != url);
        self.entries.insert(
            0,
            HistoryEntry {
                url,
                summary: summary.into(),
                timestamp: Utc::now(),
            },
        );
        self.entries.truncate(MAX_HISTORY_ENTRIES);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub async fn save(&self) -> ClientResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(&self.entries)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
