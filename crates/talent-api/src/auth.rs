//! Firebase ID token authentication.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Google JWKS URL for Firebase Auth.
const GOOGLE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Firebase token issuer prefix.
const FIREBASE_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// JWKS cache TTL.
const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600); // 1 hour

pub const MISSING_HEADER: &str = "Authorization header missing";
pub const INVALID_TOKEN: &str = "Invalid or expired token";

/// Decoded Firebase ID token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseClaims {
    /// User ID
    pub sub: String,
    pub email: Option<String>,
    pub iss: String,
    /// Audience (Firebase project ID)
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated caller extracted from the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    /// Normalized email, empty when the token carries none.
    pub email: String,
}

impl From<FirebaseClaims> for AuthUser {
    fn from(claims: FirebaseClaims) -> Self {
        Self {
            uid: claims.sub,
            email: claims
                .email
                .map(|e| talent_models::normalize_email(&e))
                .unwrap_or_default(),
        }
    }
}

/// Verifies bearer tokens into callers.
#[axum::async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthUser, ApiError>;
}

/// JWKS response from Google.
#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<JwkKey>,
}

#[derive(Debug, Clone, Deserialize)]
struct JwkKey {
    kid: String,
    n: String,
    e: String,
}

struct KeySet {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Option<Instant>,
}

/// Google signing keys, fetched on first use and refreshed hourly or
/// when a token names an unknown key id.
pub struct JwksCache {
    http: Client,
    jwks_url: String,
    project_id: String,
    keys: RwLock<KeySet>,
}

impl JwksCache {
    pub fn new(project_id: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            http,
            jwks_url: GOOGLE_JWKS_URL.to_string(),
            project_id: project_id.into(),
            keys: RwLock::new(KeySet {
                keys: HashMap::new(),
                fetched_at: None,
            }),
        })
    }

    async fn refresh_keys(&self) -> Result<(), String> {
        debug!("Refreshing JWKS keys");

        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let jwks: JwksResponse = response.json().await.map_err(|e| e.to_string())?;

        let mut keys = HashMap::new();
        for jwk in jwks.keys {
            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    keys.insert(jwk.kid, key);
                }
                Err(e) => warn!(kid = %jwk.kid, "Skipping malformed JWK: {}", e),
            }
        }

        let key_count = keys.len();
        *self.keys.write().await = KeySet {
            keys,
            fetched_at: Some(Instant::now()),
        };

        debug!("Refreshed {} JWKS keys", key_count);
        Ok(())
    }

    async fn get_key(&self, kid: &str) -> Option<DecodingKey> {
        let (stale, known) = {
            let set = self.keys.read().await;
            let stale = set.fetched_at.map_or(true, |t| t.elapsed() > JWKS_CACHE_TTL);
            (stale, set.keys.get(kid).cloned())
        };

        if let (false, Some(key)) = (stale, &known) {
            return Some(key.clone());
        }

        if let Err(e) = self.refresh_keys().await {
            warn!("Failed to refresh JWKS keys: {}", e);
            return known;
        }
        self.keys.read().await.keys.get(kid).cloned()
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[format!("{}{}", FIREBASE_ISSUER_PREFIX, self.project_id)]);
        validation.set_audience(&[&self.project_id]);
        validation
    }
}

#[axum::async_trait]
impl TokenVerifier for JwksCache {
    async fn verify(&self, token: &str) -> Result<AuthUser, ApiError> {
        let header = decode_header(token).map_err(|e| {
            debug!("Rejected token header: {}", e);
            ApiError::unauthorized(INVALID_TOKEN)
        })?;
        let kid = header.kid.ok_or_else(|| ApiError::unauthorized(INVALID_TOKEN))?;

        let key = self
            .get_key(&kid)
            .await
            .ok_or_else(|| ApiError::unauthorized(INVALID_TOKEN))?;

        let data = decode::<FirebaseClaims>(token, &key, &self.validation()).map_err(|e| {
            debug!("Token validation failed: {}", e);
            ApiError::unauthorized(INVALID_TOKEN)
        })?;

        Ok(AuthUser::from(data.claims))
    }
}

/// Token from an `Authorization` value: `Bearer <token>` or the raw token.
pub fn bearer_token(value: &str) -> Option<&str> {
    let value = value.trim();
    let token = match value.get(..6) {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer") => value[6..].trim(),
        _ => value,
    };
    (!token.is_empty()).then_some(token)
}

/// Raw ID token carried by the request, for calls that act as the caller.
pub struct IdToken(pub String);

#[axum::async_trait]
impl FromRequestParts<AppState> for IdToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized(MISSING_HEADER))?;
        let token = bearer_token(value).ok_or_else(|| ApiError::unauthorized(INVALID_TOKEN))?;
        Ok(IdToken(token.to_string()))
    }
}

/// Axum extractor for authenticated user.
#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let IdToken(token) = IdToken::from_request_parts(parts, state).await?;
        state.verifier.verify(&token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_bearer_token_forms() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer  abc.def "), Some("abc.def"));
        assert_eq!(bearer_token("abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("   "), None);
    }

    #[test]
    fn test_claims_email_normalized() {
        let user = AuthUser::from(FirebaseClaims {
            sub: "uid-1".into(),
            email: Some(" Jane@Example.COM".into()),
            iss: "https://securetoken.google.com/p".into(),
            aud: "p".into(),
            iat: 0,
            exp: 0,
        });
        assert_eq!(user.email, "jane@example.com");
    }

    #[tokio::test]
    async fn test_garbage_token_rejected_without_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": [] })))
            .expect(0)
            .mount(&server)
            .await;

        let mut cache = JwksCache::new("test-project").unwrap();
        cache.jwks_url = server.uri();
        let err = cache.verify("not-a-jwt").await.unwrap_err();
        assert_eq!(err.to_string(), INVALID_TOKEN);
    }

    #[tokio::test]
    async fn test_unknown_kid_triggers_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let mut cache = JwksCache::new("test-project").unwrap();
        cache.jwks_url = server.uri();
        assert!(cache.get_key("kid-1").await.is_none());
    }
}
