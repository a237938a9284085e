//! Job posting handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use talent_firestore::clamp_page_size;
use talent_models::{Job, JobModel, JobUpdate};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::ValidatedJson;
use crate::services::{is_admin, require_employer};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub limit: Option<u32>,
    pub start_after: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmployerJobsQuery {
    pub employer_id: String,
}

#[derive(Serialize)]
pub struct JobsResponse {
    pub jobs: Vec<Job>,
}

async fn load_job(state: &AppState, job_id: &str) -> ApiResult<Job> {
    state
        .jobs
        .get(job_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Job with ID '{}' not found", job_id)))
}

/// `POST /jobs`: the author is always the verified caller.
pub async fn create_job(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(model): ValidatedJson<JobModel>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_employer(&state, &user).await?;
    let job = state.jobs.create(&user.uid, model).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Job created successfully", "id": job.job_id })),
    ))
}

/// `PUT /jobs/:job_id`
pub async fn update_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<String>,
    ValidatedJson(update): ValidatedJson<JobUpdate>,
) -> ApiResult<Json<Value>> {
    if update.present_fields()?.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }
    let job = load_job(&state, &job_id).await?;
    if job.employer_id != user.uid {
        return Err(ApiError::forbidden("You can only modify your own jobs"));
    }
    update.check_salary_against(&job)?;

    state.jobs.update(&job_id, &update).await?;
    Ok(Json(json!({ "message": "Job updated successfully", "id": job_id })))
}

/// `DELETE /jobs/:job_id`
pub async fn delete_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let job = load_job(&state, &job_id).await?;
    if job.employer_id != user.uid && !is_admin(&state, &user).await? {
        return Err(ApiError::forbidden("You can only delete your own jobs"));
    }

    state.jobs.delete(&job_id).await?;
    info!(job_id = %job_id, by = %user.uid, "Job deleted");
    Ok(Json(json!({ "message": "Job deleted successfully", "id": job_id })))
}

/// `GET /jobs?limit=&start_after=`: newest first.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> ApiResult<Json<JobsResponse>> {
    let limit = clamp_page_size(query.limit);
    let cursor = query.start_after.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let jobs = state.jobs.list_page(limit, cursor).await?;
    Ok(Json(JobsResponse { jobs }))
}

/// `GET /jobs/:job_id`
pub async fn get_job(State(state): State<AppState>, Path(job_id): Path<String>) -> ApiResult<Json<Job>> {
    Ok(Json(load_job(&state, &job_id).await?))
}

/// `GET /employer/jobs?employer_id=`
pub async fn list_employer_jobs(
    State(state): State<AppState>,
    Query(query): Query<EmployerJobsQuery>,
) -> ApiResult<Json<JobsResponse>> {
    let jobs = state.jobs.list_by_employer(query.employer_id.trim()).await?;
    Ok(Json(JobsResponse { jobs }))
}
