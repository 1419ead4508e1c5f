//! Chat-completion summarization client.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use shortly_models::SUMMARY_FALLBACK;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::metrics::record_completion_request;

/// Fixed system instruction: summarize concisely in Korean, 2-3 sentences.
pub const SYSTEM_PROMPT: &str =
    "아래 내용을 한국어로 간결하게 요약해줘. 핵심 내용만 2-3문장으로 요약하세요.";

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 300;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Single-attempt chat-completion client.
#[derive(Clone)]
pub struct Summarizer {
    http: Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl Summarizer {
    pub fn new(config: &WorkerConfig) -> WorkerResult<Self> {
        let http = config.http_client(concat!("shortly-worker/", env!("CARGO_PKG_VERSION")))?;
        Ok(Self {
            http,
            api_key: config.openai_api_key.clone(),
            endpoint: format!("{}/v1/chat/completions", config.openai_base_url.trim_end_matches('/')),
            model: config.openai_model.clone(),
        })
    }

    /// Whether a completion credential is configured.
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Summarize plain-text content.
    ///
    /// Returns [`SUMMARY_FALLBACK`] when the response lacks
    /// `choices[0].message.content`. Non-2xx responses are errors carrying
    /// the upstream status; nothing is retried.
    pub async fn summarize(&self, content: &str) -> WorkerResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| WorkerError::config_error("OPENAI_API_KEY is not set"))?;

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        info!(model = %self.model, content_chars = content.chars().count(), "Requesting summary");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        record_completion_request(status.as_u16());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Completion API returned an error");
            return Err(WorkerError::SummarizationApi {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(extract_summary(&body))
    }
}

/// Pull `choices[0].message.content` out of a completion body.
pub fn extract_summary(body: &str) -> String {
    let content = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        value
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    });

    match content {
        Some(summary) => summary,
        None => {
            debug!("Completion response had no usable content");
            SUMMARY_FALLBACK.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn summarizer_for(server: &MockServer, key: Option<&str>) -> Summarizer {
        let config = WorkerConfig {
            openai_api_key: key.map(str::to_string),
            openai_base_url: server.uri(),
            ..WorkerConfig::default()
        };
        Summarizer::new(&config).unwrap()
    }

    #[test]
    fn test_extract_summary() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  짧은 요약입니다.  "}}]}"#;
        assert_eq!(extract_summary(body), "짧은 요약입니다.");
    }

    #[test]
    fn test_extract_summary_fallbacks() {
        assert_eq!(extract_summary(r#"{"choices":[]}"#), SUMMARY_FALLBACK);
        assert_eq!(extract_summary(r#"{"choices":[{"message":{"content":""}}]}"#), SUMMARY_FALLBACK);
        assert_eq!(extract_summary(r#"{"choices":[{"message":{"content":42}}]}"#), SUMMARY_FALLBACK);
        assert_eq!(extract_summary(r#"{"id":"x"}"#), SUMMARY_FALLBACK);
        assert_eq!(extract_summary("not json"), SUMMARY_FALLBACK);
    }

    #[tokio::test]
    async fn test_summarize_sends_prompt_and_credential() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "요약"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let summary = summarizer_for(&server, Some("sk-test"))
            .summarize("제목: 테스트")
            .await
            .unwrap();
        assert_eq!(summary, "요약");

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(body["messages"][1]["content"], "제목: 테스트");
        assert_eq!(body["max_tokens"], MAX_TOKENS);
    }

    #[tokio::test]
    async fn test_summarize_non_2xx_is_error_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .expect(1)
            .mount(&server)
            .await;

        let err = summarizer_for(&server, Some("sk-test"))
            .summarize("content")
            .await
            .unwrap_err();
        match err {
            WorkerError::SummarizationApi { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_summarize_without_credential_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let summarizer = summarizer_for(&server, None);
        assert!(!summarizer.has_credential());
        let err = summarizer.summarize("content").await.unwrap_err();
        assert!(matches!(err, WorkerError::ConfigError(_)));
    }
}
