//! Caller authorization.
//!
//! Roles come from the profile collections: an employer is a caller with an
//! `employer/{uid}` document, an admin one with an active `admins/{uid}`
//! document. Everything else is decided by ownership of the target record.

use tracing::debug;

use talent_models::{normalize_email, CandidateProfile, EmployerProfile};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn is_admin(state: &AppState, user: &AuthUser) -> ApiResult<bool> {
    Ok(state.admins.is_active_admin(&user.uid).await?)
}

pub async fn require_admin(state: &AppState, user: &AuthUser) -> ApiResult<()> {
    if is_admin(state, user).await? {
        Ok(())
    } else {
        debug!(uid = %user.uid, "Admin access denied");
        Err(ApiError::forbidden("Admin access required"))
    }
}

/// The caller's own employer profile.
pub async fn require_employer(state: &AppState, user: &AuthUser) -> ApiResult<EmployerProfile> {
    state
        .employers
        .get(&user.uid)
        .await?
        .ok_or_else(|| ApiError::forbidden("Employer account required"))
}

pub async fn require_employer_or_admin(state: &AppState, user: &AuthUser) -> ApiResult<()> {
    if state.employers.get(&user.uid).await?.is_some() || is_admin(state, user).await? {
        Ok(())
    } else {
        Err(ApiError::forbidden("Employer or admin access required"))
    }
}

/// Allow the caller whose token email is `email`, or an admin.
pub async fn authorize_email(state: &AppState, user: &AuthUser, email: &str) -> ApiResult<()> {
    if !user.email.is_empty() && normalize_email(email) == user.email {
        return Ok(());
    }
    if is_admin(state, user).await? {
        return Ok(());
    }
    Err(ApiError::forbidden("Not authorized to access this account"))
}

/// Allow the candidate's owner (same uid or same email), or an admin.
pub async fn authorize_candidate(
    state: &AppState,
    user: &AuthUser,
    candidate: &CandidateProfile,
) -> ApiResult<()> {
    let owns_id = candidate.id.as_deref() == Some(user.uid.as_str());
    let owns_email = !user.email.is_empty() && candidate.email() == user.email;
    if owns_id || owns_email || is_admin(state, user).await? {
        Ok(())
    } else {
        Err(ApiError::forbidden("Not authorized to access this candidate"))
    }
}
