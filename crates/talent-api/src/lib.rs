//! Axum HTTP API server for the Talent platform.
//!
//! This crate provides:
//! - Sign-up, login and password flows backed by Firebase Auth
//! - Firebase ID token verification against Google's JWKS
//! - Candidate, employer, job, match, interview and admin endpoints
//! - Rate limiting, security headers and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod identity;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
mod routes_tests;

pub use auth::{AuthUser, JwksCache, TokenVerifier};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use identity::{IdentityConfig, IdentityToolkitClient};
pub use routes::create_router;
pub use state::AppState;
