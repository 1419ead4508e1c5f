//! HTTP client for the Shortly API.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use shortly_models::{ResultResponse, TriggerRequest, TriggerResponse, VideoInfoResponse};

use crate::error::{ClientError, ClientResult};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Thin wrapper over the three public endpoints.
#[derive(Clone)]
pub struct ShortlyClient {
    http: Client,
    base_url: String,
}

impl ShortlyClient {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Per-request timeout must cover an inline trigger, which waits for the
    /// whole pipeline.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("shortly-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/trigger-summarize`.
    ///
    /// Any non-success answer becomes [`ClientError::Trigger`] carrying the
    /// server's error message when it sent one.
    pub async fn trigger(&self, video_url: &str) -> ClientResult<TriggerResponse> {
        let response = self
            .http
            .post(format!("{}/api/trigger-summarize", self.base_url))
            .json(&TriggerRequest {
                url: video_url.to_string(),
            })
            .send()
            .await
            .map_err(|e| ClientError::trigger(e.to_string()))?;

        let status = response.status();
        let body = response
            .json::<TriggerResponse>()
            .await
            .map_err(|_| ClientError::trigger(format!("unexpected response ({})", status.as_u16())))?;

        if !status.is_success() || !body.success {
            let message = body
                .error
                .unwrap_or_else(|| format!("request rejected ({})", status.as_u16()));
            warn!(status = status.as_u16(), error = %message, "Trigger rejected");
            return Err(ClientError::trigger(message));
        }

        debug!(video_url, job_id = ?body.job_id, "Trigger accepted");
        Ok(body)
    }

    /// `GET /api/summarize?url=`. A pending result is `Ok` with `success: false`.
    pub async fn fetch_result(&self, video_url: &str) -> ClientResult<ResultResponse> {
        let response = self
            .http
            .get(format!("{}/api/summarize", self.base_url))
            .query(&[("url", video_url)])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::http(status.as_u16(), message));
        }

        Ok(response.json().await?)
    }

    /// `GET /api/video-info?url=`.
    pub async fn video_info(&self, video_url: &str) -> ClientResult<VideoInfoResponse> {
        let response = self
            .http
            .get(format!("{}/api/video-info", self.base_url))
            .query(&[("url", video_url)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::http(status.as_u16(), message));
        }

        Ok(response.json().await?)
    }
}
