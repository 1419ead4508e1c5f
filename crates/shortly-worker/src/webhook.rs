//! External workflow webhook client.
//!
//! In `workflow` dispatch mode the trigger is forwarded to an automation
//! service, which later posts the finished summary back to the callback URL.

use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowRequest<'a> {
    url: &'a str,
    callback_url: &'a str,
}

#[derive(Clone)]
pub struct WorkflowClient {
    http: Client,
    webhook_url: Option<String>,
}

impl WorkflowClient {
    pub fn new(config: &WorkerConfig) -> WorkerResult<Self> {
        let http = config.http_client(concat!("shortly-worker/", env!("CARGO_PKG_VERSION")))?;
        Ok(Self {
            http,
            webhook_url: config.workflow_webhook_url.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Forward a video URL; succeeds once the webhook acknowledges with 2xx.
    pub async fn forward(&self, video_url: &str, callback_url: &str) -> WorkerResult<()> {
        let webhook_url = self
            .webhook_url
            .as_deref()
            .ok_or_else(|| WorkerError::config_error("WORKFLOW_WEBHOOK_URL is not set"))?;

        let response = self
            .http
            .post(webhook_url)
            .json(&WorkflowRequest {
                url: video_url,
                callback_url,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Workflow webhook rejected request");
            return Err(WorkerError::WorkflowApi {
                status: status.as_u16(),
                body,
            });
        }

        info!(video_url = %video_url, "Forwarded summary request to workflow");
        Ok(())
    }
}
