//! Result lookup and workflow callback handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info, warn};

use shortly_models::{CallbackRequest, CallbackResponse, ResultResponse, SummaryRecord};

use crate::error::{ApiError, ApiResult};
use crate::metrics::{record_callback, record_result_lookup};
use crate::state::AppState;

const CALLBACK_TOKEN_HEADER: &str = "x-callback-token";

#[derive(Debug, Deserialize)]
pub struct ResultQuery {
    pub url: Option<String>,
}

/// `GET /api/summarize?url=`
///
/// Exact-string lookup; `...&t=5s` and the bare URL are different keys.
pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<ResultQuery>,
) -> ApiResult<(StatusCode, Json<ResultResponse>)> {
    let Some(url) = query.url.filter(|u| !u.trim().is_empty()) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ResultResponse::invalid("A video URL is required")),
        ));
    };

    match state.store.get(&url).await? {
        Some(record) => {
            record_result_lookup("found");
            debug!(video_url = %url, "Summary found");
            Ok((
                StatusCode::OK,
                Json(ResultResponse::found(
                    url,
                    record.summary_text,
                    record.created_at.to_rfc3339(),
                )),
            ))
        }
        None => {
            record_result_lookup("pending");
            Ok((StatusCode::OK, Json(ResultResponse::pending(url))))
        }
    }
}

/// `POST /api/summarize`
///
/// Called by the external workflow with the finished summary.
pub async fn store_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CallbackRequest>, JsonRejection>,
) -> ApiResult<Json<CallbackResponse>> {
    if let Some(expected) = &state.config.callback_token {
        let provided = headers
            .get(CALLBACK_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());
        if provided != Some(expected.as_str()) {
            warn!("Rejected workflow callback with missing or wrong token");
            record_callback("rejected");
            return Err(ApiError::unauthorized("Invalid callback token"));
        }
    }

    let Json(callback) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    if callback.url.trim().is_empty() {
        record_callback("rejected");
        return Err(ApiError::bad_request("A video URL is required"));
    }
    if callback.summary.trim().is_empty() {
        record_callback("rejected");
        return Err(ApiError::bad_request("A summary is required"));
    }

    state
        .store
        .put(SummaryRecord::done(callback.url.as_str(), callback.summary))
        .await?;

    record_callback("stored");
    info!(video_url = %callback.url, "Stored summary from workflow callback");

    Ok(Json(CallbackResponse::stored()))
}
