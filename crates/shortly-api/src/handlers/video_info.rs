//! Video metadata handler.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::warn;

use shortly_models::{extract_video_id, VideoInfoResponse};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VideoInfoQuery {
    pub url: Option<String>,
}

/// `GET /api/video-info?url=`
///
/// Always 200; failures are reported in the body with `success: false`.
pub async fn get_video_info(
    State(state): State<AppState>,
    Query(query): Query<VideoInfoQuery>,
) -> Json<VideoInfoResponse> {
    let Some(url) = query.url.filter(|u| !u.trim().is_empty()) else {
        return Json(VideoInfoResponse::failed("A video URL is required"));
    };

    let Some(video_id) = extract_video_id(&url) else {
        return Json(VideoInfoResponse::failed("Not a valid video URL"));
    };

    match state.pipeline.metadata_source().fetch(&video_id).await {
        Ok(page) => Json(VideoInfoResponse::found(page.metadata)),
        Err(e) => {
            warn!(video_id = %video_id, error = %e, "Failed to fetch video info");
            Json(VideoInfoResponse::failed("Failed to fetch video info"))
        }
    }
}
