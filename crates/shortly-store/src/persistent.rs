//! Persistent summary table over a PostgREST-style REST API.
//!
//! Writes are insert-only appends; every successful summary adds a row. Reads
//! ask for the most recent row for a URL, so the newest append wins.

use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, Instrument};

use shortly_models::{SummaryRecord, SummaryStatus};

use crate::error::{StoreError, StoreResult};
use crate::metrics::record_request;
use crate::ResultStore;

const DEFAULT_TABLE: &str = "summaries";

// =============================================================================
// Configuration
// =============================================================================

/// Persistent store configuration.
#[derive(Debug, Clone)]
pub struct PersistentStoreConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    /// Service key sent as `apikey` and bearer token
    pub api_key: String,
    /// Table name
    pub table: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl PersistentStoreConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            table: DEFAULT_TABLE.to_string(),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Create config from environment variables.
    ///
    /// Returns `Ok(None)` when `SUPABASE_URL` is unset, meaning the service
    /// runs memory-only. A URL without a key is a configuration error.
    pub fn from_env() -> StoreResult<Option<Self>> {
        let base_url = match std::env::var("SUPABASE_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => return Ok(None),
        };

        let api_key = std::env::var("SUPABASE_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| StoreError::config_error("SUPABASE_URL is set but SUPABASE_KEY is missing"))?;

        let mut config = Self::new(base_url, api_key);
        if let Ok(table) = std::env::var("SUPABASE_TABLE") {
            if !table.trim().is_empty() {
                config.table = table;
            }
        }
        config.timeout = Duration::from_secs(
            std::env::var("SUPABASE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        );

        Ok(Some(config))
    }
}

// =============================================================================
// Row schema
// =============================================================================

/// One row of the summary table.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SummaryRow {
    url: String,
    summary: String,
    status: SummaryStatus,
    created_at: DateTime<Utc>,
}

impl From<SummaryRecord> for SummaryRow {
    fn from(record: SummaryRecord) -> Self {
        Self {
            url: record.source_url,
            summary: record.summary_text,
            status: record.status,
            created_at: record.created_at,
        }
    }
}

impl From<SummaryRow> for SummaryRecord {
    fn from(row: SummaryRow) -> Self {
        Self {
            source_url: row.url,
            summary_text: row.summary,
            created_at: row.created_at,
            status: row.status,
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// REST client for the persistent summary table.
#[derive(Clone)]
pub struct PersistentStore {
    http: Client,
    config: PersistentStoreConfig,
    table_url: String,
}

impl PersistentStore {
    pub fn new(config: PersistentStoreConfig) -> StoreResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("shortly-store/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StoreError::Network)?;

        let table_url = format!("{}/rest/v1/{}", config.base_url, config.table);

        Ok(Self {
            http,
            config,
            table_url,
        })
    }

    /// Create from environment variables; `None` when not configured.
    pub fn from_env() -> StoreResult<Option<Self>> {
        PersistentStoreConfig::from_env()?.map(Self::new).transpose()
    }

    pub fn table(&self) -> &str {
        &self.config.table
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    /// Append a row. Never updates an existing one.
    pub async fn append(&self, record: SummaryRecord) -> StoreResult<()> {
        let row = SummaryRow::from(record);

        self.execute_request("append", async {
            let response = self
                .authorized(self.http.post(&self.table_url))
                .header("Prefer", "return=minimal")
                .json(&row)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                debug!(url = %row.url, "Appended summary row");
                Ok(())
            } else {
                Err(Self::handle_error_response(status, response).await)
            }
        })
        .await
    }

    /// Most recent row for an exact URL.
    pub async fn latest(&self, url: &str) -> StoreResult<Option<SummaryRecord>> {
        let filter = format!("eq.{}", url);

        self.execute_request("latest", async {
            let response = self
                .authorized(self.http.get(&self.table_url))
                .query(&[
                    ("select", "url,summary,status,created_at"),
                    ("url", filter.as_str()),
                    ("order", "created_at.desc"),
                    ("limit", "1"),
                ])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(Self::handle_error_response(status, response).await);
            }

            let rows: Vec<SummaryRow> = response.json().await?;
            Ok(rows.into_iter().next().map(SummaryRecord::from))
        })
        .await
    }

    /// Total row count via the `Content-Range` header of a counted HEAD request.
    pub async fn count(&self) -> StoreResult<usize> {
        self.execute_request("count", async {
            let response = self
                .authorized(self.http.head(&self.table_url))
                .header("Prefer", "count=exact")
                .query(&[("select", "url")])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(Self::handle_error_response(status, response).await);
            }

            let range = response
                .headers()
                .get("content-range")
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| StoreError::invalid_response("missing Content-Range header"))?;

            parse_content_range_total(range)
        })
        .await
    }

    async fn execute_request<T, F>(&self, operation: &str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        let span = info_span!("store_request", operation = %operation, table = %self.config.table);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }

    async fn handle_error_response(status: StatusCode, response: reqwest::Response) -> StoreError {
        let body = response.text().await.unwrap_or_default();
        StoreError::from_http_status(status.as_u16(), body)
    }
}

/// Parse the total out of `Content-Range: 0-9/42` or `*/42`.
fn parse_content_range_total(range: &str) -> StoreResult<usize> {
    range
        .rsplit('/')
        .next()
        .and_then(|total| total.trim().parse().ok())
        .ok_or_else(|| StoreError::invalid_response(format!("unparsable Content-Range: {}", range)))
}

#[async_trait]
impl ResultStore for PersistentStore {
    async fn put(&self, record: SummaryRecord) -> StoreResult<()> {
        self.append(record).await
    }

    async fn get(&self, url: &str) -> StoreResult<Option<SummaryRecord>> {
        self.latest(url).await
    }

    async fn len(&self) -> StoreResult<usize> {
        self.count().await
    }

    fn backend(&self) -> &'static str {
        "persistent"
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    fn store_for(server: &MockServer) -> PersistentStore {
        PersistentStore::new(PersistentStoreConfig::new(server.uri(), "service-key")).unwrap()
    }

    #[tokio::test]
    async fn test_append_posts_row_with_auth_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/summaries"))
            .and(header("apikey", "service-key"))
            .and(header("authorization", "Bearer service-key"))
            .and(header("prefer", "return=minimal"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server);
        store.append(SummaryRecord::done(URL, "요약")).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["url"], URL);
        assert_eq!(body["summary"], "요약");
        assert_eq!(body["status"], "done");
        assert!(body["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_latest_returns_most_recent_row() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/summaries"))
            .and(query_param("url", format!("eq.{}", URL)))
            .and(query_param("order", "created_at.desc"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "url": URL,
                "summary": "newest",
                "status": "done",
                "created_at": "2026-01-02T03:04:05Z"
            }])))
            .mount(&server)
            .await;

        let record = store_for(&server).latest(URL).await.unwrap().unwrap();
        assert_eq!(record.source_url, URL);
        assert_eq!(record.summary_text, "newest");
        assert_eq!(record.status, SummaryStatus::Done);
    }

    #[tokio::test]
    async fn test_latest_empty_result_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/summaries"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        assert!(store_for(&server).latest(URL).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = store_for(&server)
            .append(SummaryRecord::done(URL, "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ServerError(503, _)));
    }

    #[tokio::test]
    async fn test_count_reads_content_range() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/rest/v1/summaries"))
            .and(header("prefer", "count=exact"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-range", "0-0/42"))
            .mount(&server)
            .await;

        assert_eq!(store_for(&server).count().await.unwrap(), 42);
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("*/7").unwrap(), 7);
        assert_eq!(parse_content_range_total("0-9/120").unwrap(), 120);
        assert!(parse_content_range_total("0-9/*").is_err());
    }

    #[test]
    fn test_config_trims_trailing_slash() {
        let config = PersistentStoreConfig::new("https://db.example.com/", "k");
        assert_eq!(config.base_url, "https://db.example.com");
        assert_eq!(config.table, "summaries");
    }

    #[test]
    #[serial]
    fn test_config_from_env_absent_is_none() {
        std::env::remove_var("SUPABASE_URL");
        std::env::remove_var("SUPABASE_KEY");
        assert!(PersistentStoreConfig::from_env().unwrap().is_none());
    }

    #[test]
    #[serial]
    fn test_config_from_env_requires_key() {
        std::env::set_var("SUPABASE_URL", "https://db.example.com");
        std::env::remove_var("SUPABASE_KEY");
        assert!(matches!(
            PersistentStoreConfig::from_env(),
            Err(StoreError::ConfigError(_))
        ));

        std::env::set_var("SUPABASE_KEY", "k");
        std::env::set_var("SUPABASE_TABLE", "video_summaries");
        let config = PersistentStoreConfig::from_env().unwrap().unwrap();
        assert_eq!(config.table, "video_summaries");

        std::env::remove_var("SUPABASE_URL");
        std::env::remove_var("SUPABASE_KEY");
        std::env::remove_var("SUPABASE_TABLE");
    }
}
