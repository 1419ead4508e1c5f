//! Memory store with an optional best-effort persistent mirror.

use async_trait::async_trait;
use tracing::{debug, warn};

use shortly_models::SummaryRecord;

use crate::error::StoreResult;
use crate::memory::MemoryStore;
use crate::metrics::record_mirror_failure;
use crate::persistent::PersistentStore;
use crate::ResultStore;

/// Writes land in memory first; the mirror is appended afterwards and its
/// failures are logged and swallowed. Reads prefer memory and fall back to
/// the mirror, warming memory on a mirror hit.
pub struct MirroredStore {
    memory: MemoryStore,
    mirror: Option<PersistentStore>,
}

impl MirroredStore {
    pub fn new(mirror: Option<PersistentStore>) -> Self {
        Self {
            memory: MemoryStore::new(),
            mirror,
        }
    }

    pub fn memory_only() -> Self {
        Self::new(None)
    }

    pub fn has_mirror(&self) -> bool {
        self.mirror.is_some()
    }
}

#[async_trait]
impl ResultStore for MirroredStore {
    async fn put(&self, record: SummaryRecord) -> StoreResult<()> {
        let mirror_copy = self.mirror.as_ref().map(|_| record.clone());
        self.memory.put(record).await?;

        if let (Some(mirror), Some(record)) = (&self.mirror, mirror_copy) {
            let url = record.source_url.clone();
            if let Err(e) = mirror.put(record).await {
                warn!(url = %url, error = %e, "Mirror write failed; result kept in memory only");
                record_mirror_failure("put");
            }
        }

        Ok(())
    }

    async fn get(&self, url: &str) -> StoreResult<Option<SummaryRecord>> {
        if let Some(record) = self.memory.get(url).await? {
            return Ok(Some(record));
        }

        let Some(mirror) = &self.mirror else {
            return Ok(None);
        };

        match mirror.get(url).await {
            Ok(Some(record)) => {
                debug!(url = %url, "Mirror hit; warming memory");
                self.memory.put(record.clone()).await?;
                Ok(Some(record))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                warn!(url = %url, error = %e, "Mirror read failed; treating as not found");
                record_mirror_failure("get");
                Ok(None)
            }
        }
    }

    async fn len(&self) -> StoreResult<usize> {
        self.memory.len().await
    }

    fn backend(&self) -> &'static str {
        if self.mirror.is_some() {
            "memory+persistent"
        } else {
            "memory"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistent::PersistentStoreConfig;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    fn mirror_for(server: &MockServer) -> PersistentStore {
        PersistentStore::new(PersistentStoreConfig::new(server.uri(), "k")).unwrap()
    }

    #[tokio::test]
    async fn test_memory_only_roundtrip() {
        let store = MirroredStore::memory_only();
        assert_eq!(store.backend(), "memory");
        store.put(SummaryRecord::done(URL, "s")).await.unwrap();
        assert_eq!(store.get(URL).await.unwrap().unwrap().summary_text, "s");
    }

    #[tokio::test]
    async fn test_mirror_failure_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let store = MirroredStore::new(Some(mirror_for(&server)));
        store.put(SummaryRecord::done(URL, "kept")).await.unwrap();

        assert_eq!(store.get(URL).await.unwrap().unwrap().summary_text, "kept");
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_falls_back_to_mirror_and_warms_memory() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "url": URL,
                "summary": "from mirror",
                "status": "done",
                "created_at": "2026-03-01T00:00:00Z"
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let store = MirroredStore::new(Some(mirror_for(&server)));
        assert_eq!(store.get(URL).await.unwrap().unwrap().summary_text, "from mirror");
        // Second read is served from memory; the mock expects exactly one call.
        assert_eq!(store.get(URL).await.unwrap().unwrap().summary_text, "from mirror");
    }

    #[tokio::test]
    async fn test_mirror_read_error_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let store = MirroredStore::new(Some(mirror_for(&server)));
        assert!(store.get(URL).await.unwrap().is_none());
    }
}
