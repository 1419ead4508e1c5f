//! Job status handler.

use axum::extract::{Path, State};
use axum::Json;

use shortly_models::{JobId, JobStatusResponse};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `GET /api/jobs/:job_id`
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobStatusResponse>> {
    let record = state
        .tracker
        .get(&JobId::from_string(job_id.as_str()))
        .await
        .ok_or_else(|| ApiError::not_found(format!("Job {}", job_id)))?;

    Ok(Json(record.into()))
}
