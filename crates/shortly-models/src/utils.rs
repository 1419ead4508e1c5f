//! Utility functions for video URL parsing.
//!
//! Shared by the worker (metadata fetch), the API (video info endpoint) and
//! the client, so every caller agrees on what counts as a video URL.

use std::sync::LazyLock;

use regex::Regex;

use crate::video::Thumbnails;

/// Length of a platform video identifier.
pub const VIDEO_ID_LEN: usize = 11;

/// Known URL shapes: `youtu.be/ID`, `/v/ID`, `/u/x/ID`, `embed/ID`,
/// `shorts/ID` and `watch?v=ID`. The identifier runs until `#`, `&` or `?`.
static VIDEO_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^.*((youtu\.be/)|(v/)|(/u/\w/)|(embed/)|(shorts/)|(watch\?))\??v?=?(?P<id>[^#&?]*).*",
    )
    .expect("video URL pattern is valid")
});

/// Extract the 11-character video identifier from a URL.
///
/// Returns `None` for anything that does not match a known shape or whose
/// captured identifier is not exactly 11 URL-safe characters. Never fails;
/// callers are expected to degrade (e.g. summarize from the URL alone).
///
/// ```
/// use shortly_models::extract_video_id;
///
/// assert_eq!(
///     extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
///     Some("dQw4w9WgXcQ")
/// );
/// assert_eq!(extract_video_id("https://example.com/video"), None);
/// ```
pub fn extract_video_id(url: &str) -> Option<String> {
    let caps = VIDEO_URL_PATTERN.captures(url.trim())?;
    let id = caps.name("id")?.as_str();

    if id.len() != VIDEO_ID_LEN || !is_valid_id_chars(id) {
        return None;
    }

    Some(id.to_string())
}

/// Check if string contains only valid video ID characters
fn is_valid_id_chars(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Canonical watch-page URL for an identifier.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Static thumbnail URLs for an identifier, smallest to largest.
pub fn thumbnail_urls(video_id: &str) -> Thumbnails {
    let base = format!("https://img.youtube.com/vi/{}", video_id);
    Thumbnails {
        default: format!("{}/default.jpg", base),
        medium: format!("{}/mqdefault.jpg", base),
        high: format!("{}/hqdefault.jpg", base),
        standard: format!("{}/sddefault.jpg", base),
        maxres: format!("{}/maxresdefault.jpg", base),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id_success_cases() {
        // Standard watch URL
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );

        // Without www
        assert_eq!(
            extract_video_id("https://youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );

        // Short link
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );

        // Embed
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );

        // /v/ form
        assert_eq!(
            extract_video_id("https://www.youtube.com/v/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );

        // Shorts
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );

        // Extra query parameters and fragments
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=5s").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=30").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ#comments").as_deref(),
            Some("dQw4w9WgXcQ")
        );

        // Surrounding whitespace from a pasted URL
        assert_eq!(
            extract_video_id("  https://youtu.be/dQw4w9WgXcQ \n").as_deref(),
            Some("dQw4w9WgXcQ")
        );

        // Hyphens and underscores are valid ID characters
        assert_eq!(
            extract_video_id("https://youtu.be/a-b_c-d_e-f").as_deref(),
            Some("a-b_c-d_e-f")
        );
    }

    #[test]
    fn test_extract_video_id_error_cases() {
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("not a url"), None);
        assert_eq!(extract_video_id("https://example.com"), None);
        assert_eq!(extract_video_id("https://vimeo.com/123456789"), None);

        // Wrong length
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQX"),
            None
        );

        // Missing identifier
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v="), None);
        assert_eq!(extract_video_id("https://youtu.be/"), None);

        // Invalid characters in an 11-char capture
        assert_eq!(extract_video_id("https://youtu.be/abc/def/ghi"), None);
        assert_eq!(extract_video_id("https://youtu.be/abc def ghi"), None);
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_thumbnail_urls() {
        let thumbs = thumbnail_urls("dQw4w9WgXcQ");
        assert_eq!(thumbs.default, "https://img.youtube.com/vi/dQw4w9WgXcQ/default.jpg");
        assert_eq!(thumbs.medium, "https://img.youtube.com/vi/dQw4w9WgXcQ/mqdefault.jpg");
        assert_eq!(thumbs.high, "https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg");
        assert_eq!(thumbs.standard, "https://img.youtube.com/vi/dQw4w9WgXcQ/sddefault.jpg");
        assert_eq!(
            thumbs.maxres,
            "https://img.youtube.com/vi/dQw4w9WgXcQ/maxresdefault.jpg"
        );
    }
}
