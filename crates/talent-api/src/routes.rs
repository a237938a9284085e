//! API routes.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::handlers::admin::{all_users, list_users, stats, update_status};
use crate::handlers::auth::{change_password, forgot_password, login, ping, signup};
use crate::handlers::candidate::{
    get_candidate, job_matches, resume_url, save_basic_details, save_job_matches, save_progress,
    update_basic_info, update_picture, update_section, upload_resume,
};
use crate::handlers::employer::{get_company_info, update_company_info, update_employer_profile, upload_logo};
use crate::handlers::interviews::{list_interviews, schedule_interview, update_interview};
use crate::handlers::jobs::{create_job, delete_job, get_job, list_employer_jobs, list_jobs, update_job};
use crate::handlers::matched::{
    accept_job, create_matched_job, decline_job, list_all_matches, list_candidate_matches, matches_summary,
    update_matched_status,
};
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    audit_server_errors, cors_layer, hide_internal_errors, rate_limit_middleware, request_id, request_logging,
    security_headers, RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    // Sign-up, login and password reset get the stricter limiter
    let auth_entry_routes = Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password));

    let account_routes = Router::new()
        .route("/ping", post(ping))
        .route("/change-password", post(change_password));

    let candidate_routes = Router::new()
        .route("/candidate", get(get_candidate))
        .route("/basic-details", post(save_basic_details))
        .route("/update-basic-info/:candidate_id", put(update_basic_info))
        .route("/update-picture", post(update_picture))
        .route("/save-progress", post(save_progress))
        .route("/candidate/upload-resume", post(upload_resume))
        .route("/candidate/resume-url", get(resume_url))
        .route("/candidate/job-matches", get(job_matches).post(save_job_matches))
        .route("/candidate/:id/:section", put(update_section));

    let employer_routes = Router::new()
        .route("/update-company-info", put(update_company_info))
        .route("/get-company-info", get(get_company_info))
        .route("/upload-logo", post(upload_logo))
        .route("/update-employer-profile", put(update_employer_profile));

    let job_routes = Router::new()
        .route("/jobs", get(list_jobs).post(create_job))
        .route("/jobs/:job_id", get(get_job).put(update_job).delete(delete_job))
        .route("/employer/jobs", get(list_employer_jobs));

    let matched_routes = Router::new()
        .route("/matched", post(create_matched_job))
        .route("/matched/:id/status", put(update_matched_status))
        .route("/accept-job", post(accept_job))
        .route("/decline-job", post(decline_job))
        .route("/matched-jobs", get(list_candidate_matches))
        .route("/all-matched-jobs", get(list_all_matches))
        .route("/job-matches-summary", get(matches_summary));

    let interview_routes = Router::new()
        .route("/interviews", get(list_interviews).post(schedule_interview))
        .route("/interviews/:id", put(update_interview));

    let admin_routes = Router::new()
        .route("/users", get(list_users))
        .route("/update-status", put(update_status))
        .route("/stats", get(stats))
        .route("/all-users", get(all_users));

    let rate_limiter = Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));
    let auth_rate_limiter = Arc::new(RateLimiterCache::new(state.config.auth_rate_limit_rps));

    let api_routes = Router::new()
        .merge(account_routes)
        .merge(candidate_routes)
        .merge(employer_routes)
        .merge(job_routes)
        .merge(matched_routes)
        .merge(interview_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(rate_limiter, rate_limit_middleware));

    let auth_entry_routes =
        auth_entry_routes.layer(middleware::from_fn_with_state(auth_rate_limiter, rate_limit_middleware));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(auth_entry_routes)
        .merge(api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // Multipart bodies are bounded by the layer below, not axum's 2MB default
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .layer(middleware::from_fn_with_state(state.clone(), hide_internal_errors))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), audit_server_errors))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
