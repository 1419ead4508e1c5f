//! In-memory result store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use shortly_models::SummaryRecord;

use crate::error::StoreResult;
use crate::ResultStore;

/// Process-wide map from exact URL string to its latest summary.
///
/// Grows for the lifetime of the process; there is no eviction or TTL.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, SummaryRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs currently stored, in no particular order.
    pub async fn keys(&self) -> Vec<String> {
        self.records.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn put(&self, record: SummaryRecord) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let replaced = records.insert(record.source_url.clone(), record).is_some();
        debug!(total = records.len(), replaced, "Stored summary in memory");
        Ok(())
    }

    async fn get(&self, url: &str) -> StoreResult<Option<SummaryRecord>> {
        Ok(self.records.read().await.get(url).cloned())
    }

    async fn len(&self) -> StoreResult<usize> {
        Ok(self.records.read().await.len())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    #[tokio::test]
    async fn test_get_missing_key_returns_none() {
        let store = MemoryStore::new();
        assert!(store.get(URL).await.unwrap().is_none());
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = MemoryStore::new();
        store.put(SummaryRecord::done(URL, "first")).await.unwrap();
        store.put(SummaryRecord::done(URL, "second")).await.unwrap();

        let record = store.get(URL).await.unwrap().unwrap();
        assert_eq!(record.summary_text, "second");
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_lookup_is_exact_string_match() {
        let store = MemoryStore::new();
        store.put(SummaryRecord::done(URL, "summary")).await.unwrap();

        let with_timestamp = format!("{}&t=5s", URL);
        assert!(store.get(&with_timestamp).await.unwrap().is_none());
        assert!(store.get("https://youtu.be/dQw4w9WgXcQ").await.unwrap().is_none());
        assert!(store.get(URL).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_writes_to_distinct_keys() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let url = format!("https://youtu.be/video{:06}", i);
                store.put(SummaryRecord::done(url, format!("summary {}", i))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.len().await.unwrap(), 20);
        assert_eq!(store.keys().await.len(), 20);
    }
}
