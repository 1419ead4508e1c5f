//! Trigger handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{info, warn};

use shortly_models::{ServiceInfoResponse, TriggerRequest, TriggerResponse};
use shortly_queue::SummarizeJob;

use crate::config::DispatchMode;
use crate::error::{ApiError, ApiResult};
use crate::metrics::record_trigger;
use crate::state::AppState;

/// `POST /api/trigger-summarize`
///
/// Validates the URL, then dispatches according to the configured mode.
/// Inline runs respond after the summary is stored; queued runs respond 202
/// with a job ID; workflow runs respond once the webhook acknowledges.
pub async fn trigger_summarize(
    State(state): State<AppState>,
    payload: Result<Json<TriggerRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TriggerResponse>)> {
    let dispatch = state.config.dispatch;
    let result = dispatch_trigger(&state, payload).await;

    record_trigger(
        dispatch.as_str(),
        if result.is_ok() { "accepted" } else { "failed" },
    );
    if let Err(e) = &result {
        warn!(dispatch = %dispatch, error = %e, "Trigger failed");
    }

    result
}

async fn dispatch_trigger(
    state: &AppState,
    payload: Result<Json<TriggerRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TriggerResponse>)> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let url = request.url;

    if url.trim().is_empty() {
        return Err(ApiError::bad_request("A video URL is required"));
    }

    info!(video_url = %url, dispatch = %state.config.dispatch, "Summary requested");

    match state.config.dispatch {
        DispatchMode::Inline => {
            let outcome = state.pipeline.run(&url).await?;
            info!(video_url = %outcome.video_url, degraded = outcome.degraded, "Summary stored");
            Ok((
                StatusCode::OK,
                Json(TriggerResponse::accepted("Summary request processed successfully")),
            ))
        }
        DispatchMode::Queued => {
            let queue = state
                .queue
                .as_ref()
                .ok_or_else(|| ApiError::internal("Job queue is not running"))?;

            let job = SummarizeJob::new(url);
            state.tracker.track(&job).await;
            if let Err(e) = queue.enqueue(job.clone()) {
                if let Err(update_err) = state.tracker.mark_failed(&job.job_id, e.to_string()).await {
                    warn!(job_id = %job.job_id, error = %update_err, "Failed to update job status");
                }
                return Err(e.into());
            }

            Ok((
                StatusCode::ACCEPTED,
                Json(TriggerResponse::queued("Summary request queued", job.job_id)),
            ))
        }
        DispatchMode::Workflow => {
            state.workflow.forward(&url, &state.config.callback_url()).await?;
            Ok((
                StatusCode::OK,
                Json(TriggerResponse::accepted("Summary request forwarded to workflow")),
            ))
        }
    }
}

/// `GET /api/trigger-summarize`
pub async fn service_info(State(state): State<AppState>) -> ApiResult<Json<ServiceInfoResponse>> {
    let stored_results = state.store.len().await?;

    Ok(Json(ServiceInfoResponse {
        message: "Shortly video summary API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "active".to_string(),
        dispatch: state.config.dispatch.as_str().to_string(),
        stored_results,
        openai_key_exists: state.pipeline.summarizer().has_credential(),
    }))
}
