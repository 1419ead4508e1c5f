//! Video metadata scraping.
//!
//! Two sequential requests per video: the oEmbed endpoint, then the watch
//! page. Fields are pulled out of the page with regular expressions; every
//! field is optional. Any transport failure, non-2xx status, or malformed
//! oEmbed body fails the whole fetch so the pipeline can fall back to
//! URL-only content.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use shortly_models::{watch_url, CaptionLine, VideoMetadata};

use crate::captions::{decode_entities, parse_caption_tracks, parse_timed_text, CaptionTrack};
use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};

/// Desktop browser User-Agent; the watch page omits player data for unknown agents.
const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<title>(.*?)</title>").expect("valid regex"));
static DESCRIPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<meta name="description" content="(.*?)""#).expect("valid regex"));
static AUTHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""author":"([^"]+)""#).expect("valid regex"));
static LENGTH_SECONDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""lengthSeconds":"(\d+)""#).expect("valid regex"));
static VIEW_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""viewCount":"(\d+)""#).expect("valid regex"));
static UPLOAD_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""uploadDate":"([^"]+)""#).expect("valid regex"));

/// Everything scraped for one video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoPage {
    pub metadata: VideoMetadata,
    pub caption_tracks: Vec<CaptionTrack>,
}

/// Source of video metadata and caption lines.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch metadata and advertised caption tracks for a validated video ID.
    async fn fetch(&self, video_id: &str) -> WorkerResult<VideoPage>;

    /// Fetch and parse one caption track.
    async fn fetch_captions(&self, track: &CaptionTrack) -> WorkerResult<Vec<CaptionLine>>;
}

#[derive(Debug, Deserialize)]
struct OEmbed {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author_name: Option<String>,
}

/// Scrapes metadata from the public video platform.
#[derive(Clone)]
pub struct YoutubeScraper {
    http: Client,
    base_url: String,
}

impl YoutubeScraper {
    pub fn new(config: &WorkerConfig) -> WorkerResult<Self> {
        let http = config.http_client(DESKTOP_USER_AGENT)?;
        Ok(Self {
            http,
            base_url: config.youtube_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_oembed(&self, video_id: &str) -> WorkerResult<OEmbed> {
        let response = self
            .http
            .get(format!("{}/oembed", self.base_url))
            .query(&[("url", watch_url(video_id).as_str()), ("format", "json")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WorkerError::metadata_failed(format!("oEmbed returned {}", status)));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| WorkerError::metadata_failed(format!("malformed oEmbed body: {}", e)))
    }

    async fn fetch_watch_page(&self, video_id: &str) -> WorkerResult<String> {
        let response = self
            .http
            .get(format!("{}/watch", self.base_url))
            .query(&[("v", video_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WorkerError::metadata_failed(format!("watch page returned {}", status)));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl MetadataSource for YoutubeScraper {
    async fn fetch(&self, video_id: &str) -> WorkerResult<VideoPage> {
        let oembed = self.fetch_oembed(video_id).await?;
        let html = self.fetch_watch_page(video_id).await?;

        let mut page = parse_watch_page(video_id, &html);
        if let Some(title) = oembed.title.filter(|t| !t.trim().is_empty()) {
            page.metadata.title = Some(title);
        }
        if let Some(author) = oembed.author_name.filter(|a| !a.trim().is_empty()) {
            page.metadata.channel_name = Some(author);
        }

        debug!(
            video_id,
            has_title = page.metadata.title.is_some(),
            caption_tracks = page.caption_tracks.len(),
            "Fetched video metadata"
        );
        Ok(page)
    }

    async fn fetch_captions(&self, track: &CaptionTrack) -> WorkerResult<Vec<CaptionLine>> {
        let response = self.http.get(&track.base_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WorkerError::captions_failed(format!("timed text returned {}", status)));
        }

        let lines = parse_timed_text(&response.text().await?);
        if lines.is_empty() {
            return Err(WorkerError::captions_failed("no caption lines in track"));
        }
        Ok(lines)
    }
}

/// Extract metadata fields and caption tracks from watch-page markup.
pub fn parse_watch_page(video_id: &str, html: &str) -> VideoPage {
    let mut metadata = VideoMetadata::new(video_id);

    metadata.title = capture(&TITLE, html)
        .map(|t| decode_entities(t.trim()).replace(" - YouTube", ""))
        .filter(|t| !t.trim().is_empty());
    metadata.description = capture(&DESCRIPTION, html).map(decode_entities);
    metadata.channel_name = capture(&AUTHOR, html).map(str::to_string);
    metadata.duration = capture(&LENGTH_SECONDS, html).and_then(|s| s.parse().ok());
    metadata.view_count = capture(&VIEW_COUNT, html).and_then(|s| s.parse().ok());
    metadata.upload_date = capture(&UPLOAD_DATE, html).map(str::to_string);

    VideoPage {
        metadata,
        caption_tracks: parse_caption_tracks(html),
    }
}

fn capture<'a>(pattern: &Regex, html: &'a str) -> Option<&'a str> {
    pattern
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VIDEO_ID: &str = "dQw4w9WgXcQ";

    fn sample_page(caption_base: &str) -> String {
        format!(
            r#"<html><head><title>Never Gonna Give You Up - YouTube</title>
<meta name="description" content="The official video &amp; more"></head>
<script>var ytInitialPlayerResponse = {{"videoDetails":{{"lengthSeconds":"213","viewCount":"1500000000","author":"Rick Astley"}},
"microformat":{{"uploadDate":"2009-10-24"}},
"captions":{{"playerCaptionsTracklistRenderer":{{"captionTracks":[{{"baseUrl":"{}/api/timedtext?v=dQw4w9WgXcQ&lang=en","languageCode":"en"}}]}}}}}};</script></html>"#,
            caption_base
        )
    }

    fn scraper_for(server: &MockServer) -> YoutubeScraper {
        let config = WorkerConfig {
            youtube_base_url: server.uri(),
            ..WorkerConfig::default()
        };
        YoutubeScraper::new(&config).unwrap()
    }

    #[test]
    fn test_parse_watch_page_fields() {
        let page = parse_watch_page(VIDEO_ID, &sample_page("https://www.youtube.com"));
        let meta = &page.metadata;

        assert_eq!(meta.title.as_deref(), Some("Never Gonna Give You Up"));
        assert_eq!(meta.description.as_deref(), Some("The official video & more"));
        assert_eq!(meta.channel_name.as_deref(), Some("Rick Astley"));
        assert_eq!(meta.duration, Some(213));
        assert_eq!(meta.view_count, Some(1_500_000_000));
        assert_eq!(meta.upload_date.as_deref(), Some("2009-10-24"));
        assert_eq!(page.caption_tracks.len(), 1);
        assert_eq!(
            page.caption_tracks[0].base_url,
            "https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=en"
        );
    }

    #[test]
    fn test_parse_watch_page_missing_fields() {
        let page = parse_watch_page(VIDEO_ID, "<html><title>YouTube</title></html>");
        let meta = &page.metadata;

        assert_eq!(meta.title.as_deref(), Some("YouTube"));
        assert!(meta.description.is_none());
        assert!(meta.channel_name.is_none());
        assert!(meta.duration.is_none());
        assert!(meta.view_count.is_none());
        assert!(page.caption_tracks.is_empty());
        assert!(meta.thumbnails.default.contains(VIDEO_ID));
    }

    #[tokio::test]
    async fn test_fetch_merges_oembed_and_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oembed"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "title": "Rick Astley - Never Gonna Give You Up (Official Video)",
                "author_name": "RickAstleyVEVO"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/watch"))
            .and(query_param("v", VIDEO_ID))
            .respond_with(ResponseTemplate::new(200).set_body_string(sample_page(&server.uri())))
            .expect(1)
            .mount(&server)
            .await;

        let page = scraper_for(&server).fetch(VIDEO_ID).await.unwrap();
        assert_eq!(
            page.metadata.title.as_deref(),
            Some("Rick Astley - Never Gonna Give You Up (Official Video)")
        );
        assert_eq!(page.metadata.channel_name.as_deref(), Some("RickAstleyVEVO"));
        assert_eq!(page.metadata.duration, Some(213));
    }

    #[tokio::test]
    async fn test_fetch_fails_on_non_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oembed"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = scraper_for(&server).fetch(VIDEO_ID).await.unwrap_err();
        assert!(matches!(err, WorkerError::MetadataFailed(_)));
    }

    #[tokio::test]
    async fn test_fetch_fails_on_malformed_oembed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oembed"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/watch"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .expect(0)
            .mount(&server)
            .await;

        let err = scraper_for(&server).fetch(VIDEO_ID).await.unwrap_err();
        assert!(matches!(err, WorkerError::MetadataFailed(_)));
    }

    #[tokio::test]
    async fn test_fetch_captions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/timedtext"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<transcript><text start="1.5" dur="2">Never gonna give you up</text></transcript>"#,
            ))
            .mount(&server)
            .await;

        let track = CaptionTrack {
            base_url: format!("{}/api/timedtext?v={}&lang=en", server.uri(), VIDEO_ID),
            language_code: "en".to_string(),
            kind: None,
        };
        let lines = scraper_for(&server).fetch_captions(&track).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].to_string(), "[00:01] Never gonna give you up");
    }

    #[tokio::test]
    async fn test_fetch_captions_empty_track_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<transcript></transcript>"))
            .mount(&server)
            .await;

        let track = CaptionTrack {
            base_url: format!("{}/api/timedtext", server.uri()),
            language_code: "ko".to_string(),
            kind: None,
        };
        let err = scraper_for(&server).fetch_captions(&track).await.unwrap_err();
        assert!(matches!(err, WorkerError::CaptionsFailed(_)));
    }
}
