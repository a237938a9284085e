//! Employer profile handlers.

use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use talent_models::{CompanyInfo, EmployerProfile, EmployerProfileUpdate};
use talent_storage::{Folder, UploadKind};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{read_upload, ValidatedJson};
use crate::handlers::candidate::EmailQuery;
use crate::services::{authorize_email, presigned_url, remove_previous, store_upload};
use crate::state::AppState;

/// Employer with `email` together with its document id, once the caller
/// is known to be that employer or an admin.
async fn load_employer(state: &AppState, user: &AuthUser, email: &str) -> ApiResult<(String, EmployerProfile)> {
    authorize_email(state, user, email).await?;
    let employer = state
        .employers
        .find_by_email(email)
        .await?
        .ok_or_else(|| ApiError::not_found("Employer not found"))?;
    let uid = employer
        .uid
        .clone()
        .ok_or_else(|| ApiError::internal("Employer document has no id"))?;
    Ok((uid, employer))
}

/// `PUT /update-company-info`
pub async fn update_company_info(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(info): ValidatedJson<CompanyInfo>,
) -> ApiResult<Json<Value>> {
    let (uid, _) = load_employer(&state, &user, &info.email).await?;
    state.employers.update_company_info(&uid, info).await?;
    info!(employer_id = %uid, "Updated company info");
    Ok(Json(json!({ "message": "Company information updated successfully" })))
}

/// `GET /get-company-info?email=`
pub async fn get_company_info(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<EmailQuery>,
) -> ApiResult<Json<Value>> {
    let (_, employer) = load_employer(&state, &user, &query.email).await?;
    let logo_url = presigned_url(&state, employer.logo.as_deref()).await;

    let mut body = serde_json::to_value(&employer).map_err(|e| ApiError::internal(e.to_string()))?;
    if let (Some(url), Some(map)) = (logo_url, body.as_object_mut()) {
        map.insert("logoUrl".to_string(), Value::String(url));
    }
    Ok(Json(body))
}

/// `POST /upload-logo?email=`
pub async fn upload_logo(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<EmailQuery>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let (uid, employer) = load_employer(&state, &user, &query.email).await?;

    let file = read_upload(&mut multipart, "file", state.config.max_upload_size).await?;
    let key = store_upload(&state, file, UploadKind::Image, Folder::CompanyLogos).await?;
    state.employers.set_logo(&uid, &key).await?;
    remove_previous(&state, employer.logo.as_deref()).await;

    let url = presigned_url(&state, Some(&key)).await;
    info!(employer_id = %uid, key = %key, "Uploaded company logo");
    Ok(Json(json!({ "message": "Logo uploaded successfully", "logoUrl": url })))
}

/// `PUT /update-employer-profile?email=`: merge present fields only.
pub async fn update_employer_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<EmailQuery>,
    ValidatedJson(update): ValidatedJson<EmployerProfileUpdate>,
) -> ApiResult<Json<Value>> {
    if update.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }
    let (uid, _) = load_employer(&state, &user, &query.email).await?;
    state.employers.merge(&uid, &update).await?;
    info!(employer_id = %uid, "Updated employer profile");
    Ok(Json(json!({ "message": "Employer profile updated successfully" })))
}
