//! Access tokens for Firestore requests.
//!
//! Production requests use a service-account token that is cached until
//! shortly before it expires. Refreshes are single-flight: concurrent
//! callers wait on one refresh instead of each hitting the token endpoint.
//! Emulator requests use a fixed token.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use gcp_auth::TokenProvider;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{FirestoreError, FirestoreResult};

/// Refresh this long before the token expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Lifetime assumed when the reported expiry cannot be converted.
const TOKEN_DEFAULT_TTL: Duration = Duration::from_secs(50 * 60);

/// OAuth scope for the Firestore REST API.
pub const FIRESTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Bearer token accepted by the Firestore emulator.
pub const EMULATOR_TOKEN: &str = "owner";

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.expires_at
    }

    fn is_unexpired(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Service-account token cache.
pub struct TokenCache {
    provider: Arc<dyn TokenProvider>,
    cache: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider,
            cache: RwLock::new(None),
        }
    }

    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    pub async fn get_token(&self) -> FirestoreResult<String> {
        if let Some(cached) = self.cache.read().await.as_ref().filter(|c| c.is_fresh()) {
            return Ok(cached.access_token.clone());
        }

        let mut cache = self.cache.write().await;
        // Another task may have refreshed while this one waited for the lock.
        if let Some(cached) = cache.as_ref().filter(|c| c.is_fresh()) {
            return Ok(cached.access_token.clone());
        }

        match self.provider.token(&[FIRESTORE_SCOPE]).await {
            Ok(token) => {
                let now = Utc::now();
                let expires_at = token.expires_at();
                // An already-expired token forces a refresh on the next call.
                let ttl = if expires_at > now {
                    (expires_at - now).to_std().unwrap_or(TOKEN_DEFAULT_TTL)
                } else {
                    Duration::ZERO
                };
                let access_token = token.as_str().to_string();
                *cache = Some(CachedToken {
                    access_token: access_token.clone(),
                    expires_at: Instant::now() + ttl,
                });
                debug!(ttl_secs = ttl.as_secs(), "Refreshed Firestore access token");
                Ok(access_token)
            }
            Err(e) => match cache.as_ref().filter(|c| c.is_unexpired()) {
                Some(cached) => {
                    warn!(error = %e, "Token refresh failed, reusing current token");
                    Ok(cached.access_token.clone())
                }
                None => Err(FirestoreError::auth_error(format!(
                    "Failed to obtain access token: {}",
                    e
                ))),
            },
        }
    }
}

/// Where request tokens come from.
#[derive(Clone)]
pub enum TokenSource {
    ServiceAccount(Arc<TokenCache>),
    Static(String),
}

impl TokenSource {
    pub fn emulator() -> Self {
        Self::Static(EMULATOR_TOKEN.to_string())
    }

    pub async fn token(&self) -> FirestoreResult<String> {
        match self {
            Self::ServiceAccount(cache) => cache.get_token().await,
            Self::Static(token) => Ok(token.clone()),
        }
    }

    /// Drop a cached token after the server rejected it. Returns whether a
    /// fresh token can be obtained.
    pub async fn invalidate(&self) -> bool {
        match self {
            Self::ServiceAccount(cache) => {
                cache.invalidate().await;
                true
            }
            Self::Static(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(TOKEN_REFRESH_MARGIN, Duration::from_secs(60));
        assert!(FIRESTORE_SCOPE.ends_with("/datastore"));
    }

    #[tokio::test]
    async fn test_static_source() {
        let source = TokenSource::emulator();
        assert_eq!(source.token().await.unwrap(), "owner");
        assert!(!source.invalidate().await);
    }
}
