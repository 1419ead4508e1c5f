//! API configuration.

use std::fmt;

use tracing::warn;

/// How `POST /api/trigger-summarize` hands off work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Run the pipeline inside the request
    #[default]
    Inline,
    /// Enqueue a job for the in-process executor
    Queued,
    /// Forward to the external workflow webhook
    Workflow,
}

impl DispatchMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "inline" => Some(Self::Inline),
            "queued" | "queue" => Some(Self::Queued),
            "workflow" | "webhook" => Some(Self::Workflow),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchMode::Inline => "inline",
            DispatchMode::Queued => "queued",
            DispatchMode::Workflow => "workflow",
        }
    }
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second, per client IP
    pub rate_limit_rps: u32,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Trigger dispatch mode
    pub dispatch: DispatchMode,
    /// Externally reachable origin used to build the workflow callback URL
    pub public_base_url: String,
    /// Shared secret expected in `X-Callback-Token` on workflow callbacks
    pub callback_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 10,
            max_body_size: 64 * 1024,
            environment: "development".to_string(),
            dispatch: DispatchMode::Inline,
            public_base_url: "http://localhost:8000".to_string(),
            callback_token: None,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let dispatch = match std::env::var("SUMMARY_DISPATCH") {
            Ok(value) => DispatchMode::parse(&value).unwrap_or_else(|| {
                warn!(value = %value, "Unknown SUMMARY_DISPATCH, using inline");
                DispatchMode::Inline
            }),
            Err(_) => DispatchMode::Inline,
        };

        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(64 * 1024),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            dispatch,
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            callback_token: std::env::var("CALLBACK_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    /// Where the workflow posts finished summaries.
    pub fn callback_url(&self) -> String {
        format!("{}/api/summarize", self.public_base_url.trim_end_matches('/'))
    }
}
