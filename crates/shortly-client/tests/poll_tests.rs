//! Poller against a mocked HTTP API.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shortly_client::{PollConfig, Poller, ShortlyClient};

const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

fn fast_config() -> PollConfig {
    PollConfig {
        warmup: Duration::from_millis(10),
        interval: Duration::from_millis(20),
        timeout: Duration::from_millis(300),
    }
}

async fn mount_trigger(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/trigger-summarize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Summary request processed successfully",
            "timestamp": "2024-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_summarize_end_to_end() {
    let server = MockServer::start().await;
    mount_trigger(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/summarize"))
        .and(query_param("url", VIDEO_URL))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "summary": "팝송 뮤직비디오 요약",
            "videoUrl": VIDEO_URL,
            "timestamp": "2024-01-01T00:00:00Z",
            "status": "done"
        })))
        .mount(&server)
        .await;

    let client = ShortlyClient::new(server.uri()).unwrap();
    let poller = Poller::new(client, fast_config());

    let summary = poller.summarize(VIDEO_URL).await.unwrap();
    assert_eq!(summary, "팝송 뮤직비디오 요약");
}

#[tokio::test]
async fn test_summarize_times_out_when_never_ready() {
    let server = MockServer::start().await;
    mount_trigger(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/summarize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "videoUrl": VIDEO_URL,
            "message": "not processed yet",
            "status": "pending"
        })))
        .mount(&server)
        .await;

    let client = ShortlyClient::new(server.uri()).unwrap();
    let poller = Poller::new(client, fast_config());

    let err = poller.summarize(VIDEO_URL).await.unwrap_err();
    assert!(err.is_timeout());

    let seen = server.received_requests().await.unwrap().len();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), seen);
}

#[tokio::test]
async fn test_summarize_trigger_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/trigger-summarize"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "A video URL is required",
            "timestamp": "2024-01-01T00:00:00Z"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/summarize"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = ShortlyClient::new(server.uri()).unwrap();
    let poller = Poller::new(client, fast_config());

    let err = poller.summarize("").await.unwrap_err();
    assert!(err.to_string().contains("A video URL is required"));
}
