//! Sign-up, login and password handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use talent_models::{
    normalize_email, BasicInformation, CandidateProfile, ChangePasswordRequest, EmployerProfile,
    ForgotPasswordRequest, LoginRequest, SignUpRequest, UserType,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::ValidatedJson;
use crate::identity::IdentityError;
use crate::state::AppState;

const ADMIN_SIGNUP_REJECTED: &str = "Admin accounts cannot be created through sign-up";

#[derive(Serialize)]
pub struct SignUpResponse {
    pub message: String,
    pub uid: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: Option<String>,
    pub uid: String,
    pub user_type: UserType,
}

async fn create_profile(state: &AppState, uid: &str, email: &str, req: &SignUpRequest) -> ApiResult<()> {
    match req.user_type {
        UserType::Candidate => {
            let profile = CandidateProfile::new(BasicInformation::from_signup(
                &req.first_name,
                &req.last_name,
                email,
            ));
            state.candidates.create(uid, &profile).await?;
        }
        UserType::Employer => {
            let profile = EmployerProfile::new(
                uid,
                email,
                &req.first_name,
                &req.last_name,
                req.company_name.clone(),
                req.contact_number.clone(),
            );
            state.employers.create(uid, &profile).await?;
        }
        UserType::Admin => return Err(ApiError::bad_request(ADMIN_SIGNUP_REJECTED)),
    }
    Ok(())
}

/// Create an auth account plus the profile document for its user type.
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SignUpRequest>,
) -> ApiResult<(StatusCode, Json<SignUpResponse>)> {
    if req.user_type == UserType::Admin {
        return Err(ApiError::bad_request(ADMIN_SIGNUP_REJECTED));
    }
    let email = normalize_email(&req.email);

    let session = match state.identity.sign_up(&email, &req.password).await {
        Ok(session) => session,
        Err(IdentityError::EmailExists) => {
            return Err(ApiError::bad_request(format!(
                "Account already exists for email {}",
                email
            )))
        }
        Err(e) => return Err(e.into()),
    };
    let uid = session.local_id.clone();

    if let Err(e) = create_profile(&state, &uid, &email, &req).await {
        error!(uid = %uid, "Profile creation failed, removing auth account: {}", e);
        if let Err(rollback) = state.identity.delete_account(&session.id_token).await {
            error!(uid = %uid, "Failed to roll back auth account: {}", rollback);
        }
        return Err(e);
    }

    info!(uid = %uid, user_type = %req.user_type, "Account created");
    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            message: format!("Account created successfully. User ID: {}", uid),
            uid,
        }),
    ))
}

/// Password sign-in for a specific account type.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let email = normalize_email(&req.email);
    let session = state
        .identity
        .sign_in_with_password(&email, &req.password)
        .await
        .map_err(|e| match e {
            IdentityError::InvalidCredentials | IdentityError::UserNotFound => {
                ApiError::unauthorized("Invalid login credentials")
            }
            other => other.into(),
        })?;

    let uid = session.local_id;
    let has_profile = match req.user_type {
        UserType::Candidate => state.candidates.get(&uid).await?.is_some(),
        UserType::Employer => state.employers.get(&uid).await?.is_some(),
        UserType::Admin => state.admins.is_active_admin(&uid).await?,
    };
    if !has_profile {
        warn!(uid = %uid, user_type = %req.user_type, "Login without matching profile");
        return Err(ApiError::forbidden(format!(
            "No {} profile found for this account",
            req.user_type
        )));
    }

    info!(uid = %uid, user_type = %req.user_type, "User logged in");
    Ok(Json(LoginResponse {
        token: session.id_token,
        refresh_token: session.refresh_token,
        uid,
        user_type: req.user_type,
    }))
}

/// Echo the verified caller.
pub async fn ping(user: AuthUser) -> Json<Value> {
    Json(json!({ "user_id": user.uid }))
}

/// Request a password reset email. Unknown addresses get the same reply.
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ForgotPasswordRequest>,
) -> Json<Value> {
    let email = normalize_email(&req.email);
    match state.identity.send_password_reset(&email).await {
        Ok(()) => info!("Password reset email requested"),
        Err(IdentityError::UserNotFound) => info!("Password reset requested for unknown account"),
        Err(e) => error!("Password reset request failed: {}", e),
    }
    Json(json!({
        "message": "If an account exists for this email, a password reset link has been sent"
    }))
}

/// Change the caller's password after re-checking the current one.
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<Json<Value>> {
    if user.email.is_empty() {
        return Err(ApiError::bad_request("Account has no email address"));
    }

    let session = state
        .identity
        .sign_in_with_password(&user.email, &req.current_password)
        .await
        .map_err(|e| match e {
            IdentityError::InvalidCredentials | IdentityError::UserNotFound => {
                ApiError::bad_request("Invalid current password")
            }
            other => other.into(),
        })?;

    state
        .identity
        .update_password(&session.id_token, &req.new_password)
        .await?;

    info!(uid = %user.uid, "Password changed");
    Ok(Json(json!({ "message": "Password updated successfully" })))
}
