//! Submit-then-poll loop.
//!
//! Fixed cadence, no backoff. The overall deadline is measured from the end
//! of the warm-up delay; once it passes no further lookups are issued.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use shortly_models::ResultResponse;

use crate::client::ShortlyClient;
use crate::error::{ClientError, ClientResult};

/// Poll timing.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Wait after a successful trigger before the first lookup
    pub warmup: Duration,
    /// Pause between lookups
    pub interval: Duration,
    /// Total polling budget after warm-up
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            warmup: Duration::from_secs(15),
            interval: Duration::from_secs(3),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Where the poller submits requests and reads results.
#[async_trait]
pub trait ResultSource: Send + Sync {
    async fn trigger(&self, video_url: &str) -> ClientResult<()>;

    async fn fetch_result(&self, video_url: &str) -> ClientResult<ResultResponse>;
}

#[async_trait]
impl ResultSource for ShortlyClient {
    async fn trigger(&self, video_url: &str) -> ClientResult<()> {
        ShortlyClient::trigger(self, video_url).await.map(|_| ())
    }

    async fn fetch_result(&self, video_url: &str) -> ClientResult<ResultResponse> {
        ShortlyClient::fetch_result(self, video_url).await
    }
}

pub struct Poller<S> {
    source: S,
    config: PollConfig,
}

impl<S: ResultSource> Poller<S> {
    pub fn new(source: S, config: PollConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Trigger a summary for `video_url` and wait for it.
    ///
    /// Lookups use the exact string that was submitted.
    pub async fn summarize(&self, video_url: &str) -> ClientResult<String> {
        self.source.trigger(video_url).await?;
        info!(video_url, "Summary requested, waiting for result");

        tokio::time::sleep(self.config.warmup).await;
        self.poll(video_url).await
    }

    /// Poll for an already-triggered summary.
    ///
    /// A lookup still in flight when the deadline passes is abandoned.
    pub async fn poll(&self, video_url: &str) -> ClientResult<String> {
        let deadline = Instant::now() + self.config.timeout;
        let mut attempts = 0u32;

        while Instant::now() < deadline {
            attempts += 1;
            let lookup = tokio::time::timeout_at(deadline, self.source.fetch_result(video_url));
            match lookup.await {
                Ok(Ok(result)) => {
                    if let Some(summary) = result.ready_summary() {
                        info!(video_url, attempts, "Summary ready");
                        return Ok(summary.to_string());
                    }
                    debug!(video_url, attempts, "Summary not ready yet");
                }
                Ok(Err(e)) => {
                    warn!(video_url, attempts, error = %e, "Result lookup failed");
                }
                Err(_) => {
                    warn!(video_url, attempts, "Result lookup still pending at deadline");
                    break;
                }
            }

            tokio::time::sleep_until(deadline.min(Instant::now() + self.config.interval)).await;
        }

        warn!(video_url, attempts, "Gave up waiting for summary");
        Err(ClientError::Timeout(self.config.timeout))
    }
}
