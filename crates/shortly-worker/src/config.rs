//! Worker configuration.

use std::time::Duration;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Chat-completion bearer credential; summarization fails without it
    pub openai_api_key: Option<String>,
    /// Chat-completion API origin
    pub openai_base_url: String,
    /// Completion model name
    pub openai_model: String,
    /// Video platform origin for oEmbed and watch pages
    pub youtube_base_url: String,
    /// Outbound request timeout
    pub http_timeout: Duration,
    /// Outbound connect timeout
    pub http_connect_timeout: Duration,
    /// Maximum concurrent queued jobs
    pub max_concurrent_jobs: usize,
    /// External workflow webhook for the `workflow` dispatch mode
    pub workflow_webhook_url: Option<String>,
    /// Graceful shutdown timeout
    pub shutdown_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            youtube_base_url: DEFAULT_YOUTUBE_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(30),
            http_connect_timeout: Duration::from_secs(10),
            max_concurrent_jobs: 2,
            workflow_webhook_url: None,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            openai_base_url: non_empty_var("OPENAI_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_model: non_empty_var("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            youtube_base_url: non_empty_var("YOUTUBE_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_YOUTUBE_BASE_URL.to_string()),
            http_timeout: Duration::from_secs(
                std::env::var("HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            http_connect_timeout: Duration::from_secs(
                std::env::var("HTTP_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            max_concurrent_jobs: std::env::var("WORKER_MAX_JOBS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(2),
            workflow_webhook_url: non_empty_var("WORKFLOW_WEBHOOK_URL"),
            shutdown_timeout: Duration::from_secs(
                std::env::var("WORKER_SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Shared outbound HTTP client honoring the configured timeouts.
    pub fn http_client(&self, user_agent: &str) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .connect_timeout(self.http_connect_timeout)
            .user_agent(user_agent)
            .build()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "OPENAI_API_KEY",
        "OPENAI_BASE_URL",
        "OPENAI_MODEL",
        "YOUTUBE_BASE_URL",
        "HTTP_TIMEOUT_SECS",
        "WORKER_MAX_JOBS",
        "WORKFLOW_WEBHOOK_URL",
    ];

    fn clear() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear();
        let config = WorkerConfig::from_env();
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.openai_base_url, "https://api.openai.com");
        assert_eq!(config.openai_model, "gpt-4");
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.max_concurrent_jobs, 2);
        assert!(config.workflow_webhook_url.is_none());
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear();
        std::env::set_var("OPENAI_API_KEY", "sk-test");
        std::env::set_var("OPENAI_BASE_URL", "http://localhost:9999/");
        std::env::set_var("HTTP_TIMEOUT_SECS", "5");
        std::env::set_var("WORKER_MAX_JOBS", "0");
        std::env::set_var("WORKFLOW_WEBHOOK_URL", "   ");

        let config = WorkerConfig::from_env();
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.openai_base_url, "http://localhost:9999");
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.max_concurrent_jobs, 2);
        assert!(config.workflow_webhook_url.is_none());
        clear();
    }
}
