//! Candidate profile handlers.

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use talent_firestore::FirestoreError;
use talent_models::{BasicInformation, CandidateProfile, CandidateSection, JobMatch, ProgressUpdate};
use talent_storage::{Folder, UploadKind};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{read_upload, JsonBody, ValidatedJson};
use crate::services::{
    authorize_candidate, compute_matches, persist_matches, presigned_url, remove_previous, store_upload,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct CandidateIdQuery {
    pub candidate_id: String,
}

fn candidate_not_found() -> ApiError {
    ApiError::not_found("Candidate not found")
}

fn missing_as_not_found(err: FirestoreError) -> ApiError {
    match err {
        FirestoreError::NotFound(_) => candidate_not_found(),
        other => other.into(),
    }
}

fn candidate_id(candidate: &CandidateProfile) -> ApiResult<&str> {
    candidate
        .id
        .as_deref()
        .ok_or_else(|| ApiError::internal("Candidate document has no id"))
}

/// Candidate with the given email, after checking the caller may see it.
async fn load_by_email(state: &AppState, user: &AuthUser, email: &str) -> ApiResult<CandidateProfile> {
    let candidate = state
        .candidates
        .find_by_email(email)
        .await?
        .ok_or_else(candidate_not_found)?;
    authorize_candidate(state, user, &candidate).await?;
    Ok(candidate)
}

async fn load_by_id(state: &AppState, user: &AuthUser, id: &str) -> ApiResult<CandidateProfile> {
    let candidate = state.candidates.get(id).await?.ok_or_else(candidate_not_found)?;
    authorize_candidate(state, user, &candidate).await?;
    Ok(candidate)
}

/// `GET /candidate?email=`
pub async fn get_candidate(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<EmailQuery>,
) -> ApiResult<Json<Value>> {
    let candidate = load_by_email(&state, &user, &query.email).await?;
    let picture_url = presigned_url(&state, candidate.profile_picture.as_deref()).await;

    let mut body = serde_json::to_value(&candidate).map_err(|e| ApiError::internal(e.to_string()))?;
    if let (Some(url), Some(map)) = (picture_url, body.as_object_mut()) {
        map.insert("profilePictureUrl".to_string(), Value::String(url));
    }
    Ok(Json(json!({ "candidates": [body] })))
}

/// `POST /basic-details`: the caller's own basic information.
pub async fn save_basic_details(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(basic): ValidatedJson<BasicInformation>,
) -> ApiResult<Json<Value>> {
    state
        .candidates
        .update_basic_info(&user.uid, basic)
        .await
        .map_err(missing_as_not_found)?;
    info!(candidate_id = %user.uid, "Saved basic details");
    Ok(Json(json!({ "message": "Basic information saved successfully" })))
}

/// `PUT /update-basic-info/:candidate_id`
pub async fn update_basic_info(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(basic): ValidatedJson<BasicInformation>,
) -> ApiResult<Json<Value>> {
    load_by_id(&state, &user, &id).await?;
    state
        .candidates
        .update_basic_info(&id, basic)
        .await
        .map_err(missing_as_not_found)?;
    info!(candidate_id = %id, "Updated basic information");
    Ok(Json(json!({ "message": "Basic information updated successfully" })))
}

/// `POST /update-picture?candidate_id=`
pub async fn update_picture(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CandidateIdQuery>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    // The candidate must exist before anything is uploaded.
    let candidate = load_by_id(&state, &user, &query.candidate_id).await?;
    let id = candidate_id(&candidate)?;

    let file = read_upload(&mut multipart, "file", state.config.max_upload_size).await?;
    let key = store_upload(&state, file, UploadKind::Image, Folder::ProfilePictures).await?;
    state.candidates.set_profile_picture(id, &key).await?;
    remove_previous(&state, candidate.profile_picture.as_deref()).await;

    let url = presigned_url(&state, Some(&key)).await;
    info!(candidate_id = %id, key = %key, "Updated profile picture");
    Ok(Json(json!({
        "message": "Profile picture updated successfully",
        "profile_picture_url": url
    })))
}

/// `POST /save-progress?email=`
pub async fn save_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<EmailQuery>,
    JsonBody(update): JsonBody<ProgressUpdate>,
) -> ApiResult<Json<Value>> {
    update.validate()?;
    let candidate = load_by_email(&state, &user, &query.email).await?;
    let id = candidate_id(&candidate)?;

    state.candidates.update_progress(id, &update.steps).await?;
    Ok(Json(json!({ "message": "Progress saved successfully" })))
}

/// `PUT /candidate/:id/:section`
pub async fn update_section(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, section)): Path<(String, String)>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Json<Value>> {
    let section: CandidateSection = section
        .parse()
        .map_err(|e: talent_models::ModelError| ApiError::not_found(e.to_string()))?;
    load_by_id(&state, &user, &id).await?;
    let value = section.parse_body(body)?;

    state
        .candidates
        .update_section(&id, section, &value)
        .await
        .map_err(missing_as_not_found)?;

    Ok(Json(json!({
        "message": format!("{} updated successfully", section),
        "section": section.as_str(),
        "value": value
    })))
}

/// `POST /candidate/upload-resume?email=`
pub async fn upload_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<EmailQuery>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let candidate = load_by_email(&state, &user, &query.email).await?;
    let id = candidate_id(&candidate)?;

    let file = read_upload(&mut multipart, "file", state.config.max_upload_size).await?;
    let key = store_upload(&state, file, UploadKind::Document, Folder::Resumes).await?;
    state.candidates.set_resume(id, &key).await?;
    remove_previous(&state, candidate.resume.as_deref()).await;

    let url = presigned_url(&state, Some(&key)).await;
    info!(candidate_id = %id, key = %key, "Uploaded resume");
    Ok(Json(json!({ "message": "Resume uploaded successfully", "resumeUrl": url })))
}

/// `GET /candidate/resume-url?email=`
pub async fn resume_url(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<EmailQuery>,
) -> ApiResult<Json<Value>> {
    let candidate = load_by_email(&state, &user, &query.email).await?;
    let stored = candidate
        .resume
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| ApiError::not_found("No resume uploaded"))?;

    let key = state
        .storage
        .key_from_url(stored)
        .ok_or_else(|| ApiError::not_found("No resume uploaded"))?;
    let url = state.storage.presign(&key).await?;
    Ok(Json(json!({ "resumeUrl": url })))
}

/// `GET /candidate/job-matches?email=`
pub async fn job_matches(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<EmailQuery>,
) -> ApiResult<Json<Value>> {
    let candidate = load_by_email(&state, &user, &query.email).await?;
    let matches: Vec<JobMatch> = compute_matches(&state, &candidate)
        .await?
        .into_iter()
        .map(|m| m.result)
        .collect();
    Ok(Json(json!({ "matches": matches })))
}

/// `POST /candidate/job-matches?email=`: persist new matches.
pub async fn save_job_matches(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<EmailQuery>,
) -> ApiResult<Json<Value>> {
    let candidate = load_by_email(&state, &user, &query.email).await?;
    let matches = compute_matches(&state, &candidate).await?;
    let total = matches.len();
    let created = persist_matches(&state, candidate.email(), matches).await?;

    Ok(Json(json!({
        "message": format!("{} new matches saved", created.len()),
        "total_matches": total,
        "created": created
    })))
}
