//! Caption track discovery and timed-text parsing.
//!
//! Captions are a nested best-effort step: any failure yields
//! [`Captions::Unavailable`] with a placeholder string instead of an error.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Deserialize;

use shortly_models::CaptionLine;

/// Maximum caption lines kept per fetch.
pub const MAX_CAPTION_LINES: usize = 20;

/// Placeholder used when no caption lines could be retrieved.
pub const CAPTIONS_UNAVAILABLE: &str = "자막 정보를 가져올 수 없습니다.";

const CAPTION_TRACKS_KEY: &str = "\"captionTracks\":";

static TEXT_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text\b([^>]*)>(.*?)</text>").expect("valid regex"));

static START_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bstart="([0-9.]+)""#).expect("valid regex"));

static INNER_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("valid regex"));

/// A caption track advertised by the watch page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    #[serde(default)]
    pub language_code: String,
    #[serde(default)]
    pub kind: Option<String>,
}

/// Caption lines, or a placeholder explaining why there are none.
#[derive(Debug, Clone, PartialEq)]
pub enum Captions {
    Lines(Vec<CaptionLine>),
    Unavailable(String),
}

impl Captions {
    pub fn unavailable() -> Self {
        Self::Unavailable(CAPTIONS_UNAVAILABLE.to_string())
    }

    pub fn lines(&self) -> &[CaptionLine] {
        match self {
            Captions::Lines(lines) => lines,
            Captions::Unavailable(_) => &[],
        }
    }

    /// Plain-text rendering, one `[mm:ss] text` line per caption.
    pub fn render(&self) -> String {
        match self {
            Captions::Lines(lines) => lines
                .iter()
                .map(|line| line.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
            Captions::Unavailable(reason) => reason.clone(),
        }
    }
}

/// Extract the `"captionTracks":[...]` array from watch-page markup.
///
/// Only the array value is deserialized; the rest of the page is ignored.
pub fn parse_caption_tracks(html: &str) -> Vec<CaptionTrack> {
    let Some(start) = html.find(CAPTION_TRACKS_KEY) else {
        return Vec::new();
    };
    let rest = &html[start + CAPTION_TRACKS_KEY.len()..];

    serde_json::Deserializer::from_str(rest)
        .into_iter::<Vec<CaptionTrack>>()
        .next()
        .and_then(Result::ok)
        .unwrap_or_default()
}

/// Korean first, then English, then whatever comes first.
pub fn select_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.language_code.starts_with("ko"))
        .or_else(|| tracks.iter().find(|t| t.language_code.starts_with("en")))
        .or_else(|| tracks.first())
}

/// Parse timed-text XML into at most [`MAX_CAPTION_LINES`] lines.
///
/// Elements without a parsable `start` or with empty text are skipped.
pub fn parse_timed_text(xml: &str) -> Vec<CaptionLine> {
    TEXT_ELEMENT
        .captures_iter(xml)
        .filter_map(|caps| {
            let attrs = caps.get(1)?.as_str();
            let start: f64 = START_ATTR.captures(attrs)?.get(1)?.as_str().parse().ok()?;
            let text = clean_text(caps.get(2)?.as_str());
            (!text.is_empty()).then(|| CaptionLine::new(start, text))
        })
        .take(MAX_CAPTION_LINES)
        .collect()
}

fn clean_text(raw: &str) -> String {
    // Timed text is frequently double-encoded (`&amp;#39;`).
    let decoded = decode_entities(&decode_entities(raw));
    let stripped = INNER_TAG.replace_all(&decoded, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode named and numeric HTML entities. Unknown entities are left alone.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
                }
                _ if entity.starts_with('#') => entity[1..].parse().ok().and_then(char::from_u32),
                _ => None,
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(lang: &str) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://example.com/{}", lang),
            language_code: lang.to_string(),
            kind: None,
        }
    }

    #[test]
    fn test_parse_caption_tracks_from_page() {
        let html = r#"var ytInitialPlayerResponse = {"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en","name":{"runs":[{"text":"English"}]},"languageCode":"en","kind":"asr"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=ko","languageCode":"ko"}],"audioTracks":[]}}};"#;

        let tracks = parse_caption_tracks(html);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].base_url, "https://www.youtube.com/api/timedtext?v=abc&lang=en");
        assert_eq!(tracks[0].kind.as_deref(), Some("asr"));
        assert_eq!(tracks[1].language_code, "ko");
    }

    #[test]
    fn test_parse_caption_tracks_absent_or_broken() {
        assert!(parse_caption_tracks("<html>no captions</html>").is_empty());
        assert!(parse_caption_tracks(r#""captionTracks":[{"baseUrl": oops"#).is_empty());
    }

    #[test]
    fn test_select_track_preference() {
        let tracks = vec![track("de"), track("en"), track("ko")];
        assert_eq!(select_track(&tracks).unwrap().language_code, "ko");

        let tracks = vec![track("de"), track("en-GB")];
        assert_eq!(select_track(&tracks).unwrap().language_code, "en-GB");

        let tracks = vec![track("de"), track("fr")];
        assert_eq!(select_track(&tracks).unwrap().language_code, "de");

        assert!(select_track(&[]).is_none());
    }

    #[test]
    fn test_parse_timed_text() {
        let xml = r##"<?xml version="1.0" encoding="utf-8" ?><transcript>
            <text start="0.5" dur="2.1">Hello &amp;amp; welcome</text>
            <text start="75.2" dur="3">it&amp;#39;s   <font color="#fff">here</font></text>
            <text start="80" dur="1"></text>
            <text dur="1">no start</text>
        </transcript>"##;

        let lines = parse_timed_text(xml);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].to_string(), "[00:00] Hello & welcome");
        assert_eq!(lines[1].to_string(), "[01:15] it's here");
    }

    #[test]
    fn test_parse_timed_text_caps_lines() {
        let xml: String = (0..50)
            .map(|i| format!(r#"<text start="{}" dur="1">line {}</text>"#, i, i))
            .collect();
        let lines = parse_timed_text(&xml);
        assert_eq!(lines.len(), MAX_CAPTION_LINES);
        assert_eq!(lines.last().unwrap().text, "line 19");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &lt;b&gt; &quot;c&quot;"), "a <b> \"c\"");
        assert_eq!(decode_entities("&#39;&#x41;&#X42;"), "'AB");
        assert_eq!(decode_entities("&unknown; &#xZZ;"), "&unknown; &#xZZ;");
    }

    #[test]
    fn test_captions_render() {
        let captions = Captions::Lines(vec![
            CaptionLine::new(1.0, "first"),
            CaptionLine::new(61.0, "second"),
        ]);
        assert_eq!(captions.render(), "[00:01] first\n[01:01] second");
        assert_eq!(captions.lines().len(), 2);

        let none = Captions::unavailable();
        assert_eq!(none.render(), CAPTIONS_UNAVAILABLE);
        assert!(none.lines().is_empty());
    }
}
