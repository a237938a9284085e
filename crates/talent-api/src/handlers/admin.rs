//! Admin handlers: user listing, review status and counts.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use talent_models::{normalize_email, CandidateProfile, EmployerProfile, ProfileStatus, UserType};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::require_admin;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub user_type: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusQuery {
    pub email: String,
    pub status: String,
    pub user_type: String,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub candidate: usize,
    pub employer: usize,
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn candidate_matches(c: &CandidateProfile, search: &str, status: Option<&str>) -> bool {
    let info = &c.basic_info;
    let hit = search.is_empty()
        || contains(&info.first_name, search)
        || contains(&info.last_name, search)
        || contains(&info.email, search);
    hit && status.map_or(true, |s| c.status.as_str() == s)
}

fn employer_matches(e: &EmployerProfile, search: &str, status: Option<&str>) -> bool {
    let hit = search.is_empty()
        || e.company_name.as_deref().is_some_and(|name| contains(name, search))
        || contains(&e.email, search);
    hit && status.map_or(true, |s| e.status.as_str() == s)
}

/// Serialize a profile with its document id and user type made explicit.
fn with_identity<T: Serialize>(value: &T, id: Option<&str>, user_type: UserType) -> ApiResult<Value> {
    let mut body = serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))?;
    if let Some(map) = body.as_object_mut() {
        if let Some(id) = id {
            map.insert("id".to_string(), Value::String(id.to_string()));
        }
        map.insert("userType".to_string(), json!(user_type));
    }
    Ok(body)
}

/// `GET /users?userType=&search=&status=`
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<Value>> {
    require_admin(&state, &user).await?;

    let user_type: UserType = match query.user_type.as_deref().map(str::trim) {
        None | Some("") => return Err(ApiError::bad_request("userType is required")),
        Some(raw) => raw.parse()?,
    };
    let search = query.search.as_deref().unwrap_or_default().trim().to_lowercase();
    let status = query
        .status
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let status = status.as_deref();

    let users: Vec<Value> = match user_type {
        UserType::Candidate => state
            .candidates
            .list_all()
            .await?
            .iter()
            .filter(|c| candidate_matches(c, &search, status))
            .map(|c| with_identity(c, c.id.as_deref(), UserType::Candidate))
            .collect::<ApiResult<_>>()?,
        UserType::Employer => state
            .employers
            .list_all()
            .await?
            .iter()
            .filter(|e| employer_matches(e, &search, status))
            .map(|e| with_identity(e, e.uid.as_deref(), UserType::Employer))
            .collect::<ApiResult<_>>()?,
        UserType::Admin => {
            return Err(ApiError::bad_request("userType must be candidate or employer"));
        }
    };

    Ok(Json(json!({ "users": users, "total": users.len() })))
}

/// `PUT /update-status?email=&status=&userType=`
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<UpdateStatusQuery>,
) -> ApiResult<Json<Value>> {
    require_admin(&state, &user).await?;

    let status: ProfileStatus = query.status.parse()?;
    let user_type: UserType = query.user_type.parse()?;
    let email = normalize_email(&query.email);
    let not_found = || ApiError::not_found(format!("{} not found", user_type.label()));

    match user_type {
        UserType::Candidate => {
            let candidate = state.candidates.find_by_email(&email).await?.ok_or_else(not_found)?;
            let id = candidate.id.ok_or_else(not_found)?;
            state.candidates.set_status(&id, status).await?;
        }
        UserType::Employer => {
            let employer = state.employers.find_by_email(&email).await?.ok_or_else(not_found)?;
            let uid = employer.uid.ok_or_else(not_found)?;
            state.employers.set_status(&uid, status).await?;
        }
        UserType::Admin => {
            return Err(ApiError::bad_request("userType must be candidate or employer"));
        }
    }

    info!(email = %email, status = %status, user_type = %user_type, by = %user.uid, "Profile status updated");
    Ok(Json(json!({
        "message": format!("Status for {} updated to {}", email, status)
    })))
}

/// `GET /stats`
pub async fn stats(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<StatsResponse>> {
    require_admin(&state, &user).await?;
    let (candidates, employers) = tokio::try_join!(state.candidates.list_all(), state.employers.list_all())?;
    Ok(Json(StatsResponse {
        candidate: candidates.len(),
        employer: employers.len(),
    }))
}

/// `GET /all-users`
pub async fn all_users(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    require_admin(&state, &user).await?;
    let (admins, employers, candidates) = tokio::try_join!(
        state.admins.list_all(),
        state.employers.list_all(),
        state.candidates.list_all()
    )?;

    let mut users = Vec::with_capacity(admins.len() + employers.len() + candidates.len());
    for admin in &admins {
        users.push(with_identity(admin, admin.id.as_deref(), UserType::Admin)?);
    }
    for employer in &employers {
        users.push(with_identity(employer, employer.uid.as_deref(), UserType::Employer)?);
    }
    for candidate in &candidates {
        users.push(with_identity(candidate, candidate.id.as_deref(), UserType::Candidate)?);
    }

    Ok(Json(json!({ "users": users })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use talent_models::BasicInformation;

    #[test]
    fn test_candidate_search_and_status() {
        let mut candidate = CandidateProfile::new(BasicInformation::from_signup("Thandi", "Nkosi", "thandi@example.com"));
        candidate.status = ProfileStatus::Approved;

        assert!(candidate_matches(&candidate, "", None));
        assert!(candidate_matches(&candidate, "nko", Some("approved")));
        assert!(candidate_matches(&candidate, "example.com", None));
        assert!(!candidate_matches(&candidate, "nko", Some("pending")));
        assert!(!candidate_matches(&candidate, "zulu", None));
    }

    #[test]
    fn test_employer_search_by_company() {
        let employer = EmployerProfile::new(
            "uid-9",
            "hr@acme.io",
            "Ada",
            "Lovelace",
            Some("Acme Robotics".into()),
            None,
        );
        assert!(employer_matches(&employer, "robotics", Some("pending")));
        assert!(employer_matches(&employer, "hr@", None));
        assert!(!employer_matches(&employer, "lovelace", None));
    }

    #[test]
    fn test_with_identity_adds_id_and_type() {
        let employer = EmployerProfile::new("uid-9", "hr@acme.io", "Ada", "Lovelace", None, None);
        let value = with_identity(&employer, employer.uid.as_deref(), UserType::Employer).unwrap();
        assert_eq!(value["id"], "uid-9");
        assert_eq!(value["userType"], "employer");
    }
}
