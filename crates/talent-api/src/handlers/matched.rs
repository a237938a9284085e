//! Match record handlers.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use talent_models::{
    normalize_email, JobActionRequest, JobMatchSummary, MatchedJob, MatchedJobStatus, MatchedStatusUpdate,
    NewMatchedJob,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{JsonBody, ValidatedJson};
use crate::services::{authorize_email, require_admin, require_employer_or_admin};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CandidateEmailQuery {
    pub candidate_email: String,
}

#[derive(Serialize)]
pub struct MatchedJobsResponse {
    pub matched_jobs: Vec<MatchedJob>,
}

/// `POST /matched`
pub async fn create_matched_job(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(new): ValidatedJson<NewMatchedJob>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_employer_or_admin(&state, &user).await?;
    let email = normalize_email(&new.candidate_email);
    let record = MatchedJob::from_new(new, email);
    let id = state.matched.create(&record).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Matched job saved successfully", "id": id })),
    ))
}

async fn respond_to_match(
    state: &AppState,
    user: &AuthUser,
    req: JobActionRequest,
    status: MatchedJobStatus,
) -> ApiResult<Json<Value>> {
    let email = normalize_email(&req.candidate_email);
    if user.email != email {
        return Err(ApiError::forbidden("You can only respond to your own matches"));
    }

    let job_id = req.job_id.trim();
    let record = state
        .matched
        .find_by_candidate_and_job(&email, job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("No match found for this job"))?;
    let id = record
        .id
        .ok_or_else(|| ApiError::internal("Match record has no id"))?;

    state.matched.set_status(&id, status).await?;
    info!(match_id = %id, job_id = %job_id, status = %status, "Candidate responded to match");
    Ok(Json(json!({
        "message": format!("Job {} successfully", status),
        "id": id,
        "status": status
    })))
}

/// `POST /accept-job`
pub async fn accept_job(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<JobActionRequest>,
) -> ApiResult<Json<Value>> {
    respond_to_match(&state, &user, req, MatchedJobStatus::Accepted).await
}

/// `POST /decline-job`
pub async fn decline_job(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<JobActionRequest>,
) -> ApiResult<Json<Value>> {
    respond_to_match(&state, &user, req, MatchedJobStatus::Declined).await
}

/// `PUT /matched/:id/status`
pub async fn update_matched_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<MatchedStatusUpdate>,
) -> ApiResult<Json<Value>> {
    require_employer_or_admin(&state, &user).await?;
    if state.matched.get(&id).await?.is_none() {
        return Err(ApiError::not_found("Matched job not found"));
    }
    state.matched.set_status(&id, update.status).await?;
    Ok(Json(json!({
        "message": format!("Status updated to {}", update.status),
        "id": id,
        "status": update.status
    })))
}

/// `GET /matched-jobs?candidate_email=`
pub async fn list_candidate_matches(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CandidateEmailQuery>,
) -> ApiResult<Json<MatchedJobsResponse>> {
    authorize_email(&state, &user, &query.candidate_email).await?;
    let matched_jobs = state.matched.list_by_candidate(&query.candidate_email).await?;
    Ok(Json(MatchedJobsResponse { matched_jobs }))
}

/// `GET /all-matched-jobs`
pub async fn list_all_matches(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<MatchedJobsResponse>> {
    require_admin(&state, &user).await?;
    let matched_jobs = state.matched.list_all().await?;
    Ok(Json(MatchedJobsResponse { matched_jobs }))
}

/// `GET /job-matches-summary`
pub async fn matches_summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<BTreeMap<String, JobMatchSummary>>> {
    require_admin(&state, &user).await?;
    Ok(Json(state.matched.summary().await?))
}
