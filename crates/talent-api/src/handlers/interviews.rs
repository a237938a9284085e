//! Interview scheduling handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use talent_models::{normalize_email, Interview, InterviewUpdate, NewInterview};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::ValidatedJson;
use crate::services::require_employer_or_admin;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InterviewQuery {
    pub candidate_email: String,
    pub job_id: Option<String>,
}

#[derive(Serialize)]
pub struct InterviewsResponse {
    pub interviews: Vec<Interview>,
}

/// `POST /interviews`
pub async fn schedule_interview(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(new): ValidatedJson<NewInterview>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_employer_or_admin(&state, &user).await?;
    let email = normalize_email(&new.candidate_email);
    let interview = Interview::schedule(new, email);
    let id = state.interviews.create(&interview).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Interview scheduled successfully", "id": id })),
    ))
}

/// `GET /interviews?candidate_email=&job_id=`
pub async fn list_interviews(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<InterviewQuery>,
) -> ApiResult<Json<InterviewsResponse>> {
    if normalize_email(&query.candidate_email) != user.email {
        require_employer_or_admin(&state, &user).await?;
    }
    let interviews = state
        .interviews
        .list_by_candidate(&query.candidate_email, query.job_id.as_deref())
        .await?;
    Ok(Json(InterviewsResponse { interviews }))
}

/// `PUT /interviews/:id`
pub async fn update_interview(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(update): ValidatedJson<InterviewUpdate>,
) -> ApiResult<Json<Value>> {
    require_employer_or_admin(&state, &user).await?;
    if update.present_fields()?.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }
    if state.interviews.get(&id).await?.is_none() {
        return Err(ApiError::not_found("Interview not found"));
    }
    state.interviews.update(&id, &update).await?;
    Ok(Json(json!({ "message": "Interview updated successfully", "id": id })))
}
