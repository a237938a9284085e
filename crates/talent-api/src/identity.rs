//! Firebase Identity Toolkit REST client.
//!
//! Covers the account operations the API performs on behalf of users:
//! sign-up, password sign-in, password reset emails, password changes and
//! account deletion. ID-token verification lives in [`crate::auth`].

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

pub type IdentityResult<T> = Result<T, IdentityError>;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Account already exists")]
    EmailExists,

    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Weak password: {0}")]
    WeakPassword(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Too many attempts, try again later")]
    TooManyAttempts,

    #[error("Identity API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Identity configuration error: {0}")]
    Config(String),
}

impl IdentityError {
    /// Map an Identity Toolkit error message such as
    /// `WEAK_PASSWORD : Password should be at least 6 characters`.
    fn from_api(status: u16, message: &str) -> Self {
        let (code, detail) = match message.split_once(':') {
            Some((code, detail)) => (code.trim(), detail.trim()),
            None => (message.trim(), ""),
        };
        match code {
            "EMAIL_EXISTS" => Self::EmailExists,
            "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL" | "USER_DISABLED" => {
                Self::InvalidCredentials
            }
            "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => Self::UserNotFound,
            "WEAK_PASSWORD" => Self::WeakPassword(detail.to_string()),
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyAttempts,
            _ => Self::Api {
                status,
                message: message.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl IdentityConfig {
    /// Read `FIREBASE_API_KEY`, switching to the auth emulator when
    /// `FIREBASE_AUTH_EMULATOR_HOST` is set.
    pub fn from_env() -> IdentityResult<Self> {
        let emulator = std::env::var("FIREBASE_AUTH_EMULATOR_HOST")
            .ok()
            .filter(|h| !h.trim().is_empty());
        let api_key = std::env::var("FIREBASE_API_KEY").ok().filter(|k| !k.is_empty());

        match (emulator, api_key) {
            (Some(host), key) => Ok(Self::emulator(&host, key.as_deref().unwrap_or("emulator"))),
            (None, Some(api_key)) => Ok(Self {
                api_key,
                base_url: IDENTITY_TOOLKIT_URL.to_string(),
                timeout: Duration::from_secs(10),
            }),
            (None, None) => Err(IdentityError::Config("FIREBASE_API_KEY not set".into())),
        }
    }

    /// Auth emulator at `host` (with or without an `http://` prefix).
    pub fn emulator(host: &str, api_key: &str) -> Self {
        let host = host.trim().trim_end_matches('/');
        let origin = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{host}")
        };
        Self {
            api_key: api_key.to_string(),
            base_url: format!("{origin}/identitytoolkit.googleapis.com/v1"),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Tokens returned by sign-up and sign-in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Clone)]
pub struct IdentityToolkitClient {
    http: Client,
    config: IdentityConfig,
}

impl IdentityToolkitClient {
    pub fn new(config: IdentityConfig) -> IdentityResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> IdentityResult<Self> {
        Self::new(IdentityConfig::from_env()?)
    }

    async fn call<B: Serialize, T: DeserializeOwned>(&self, action: &str, body: &B) -> IdentityResult<T> {
        let url = format!("{}/accounts:{}", self.config.base_url, action);
        debug!(action, "Identity Toolkit request");

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&text)
            .map(|e| e.error.message)
            .unwrap_or(text);
        let err = IdentityError::from_api(status.as_u16(), &message);
        if matches!(err, IdentityError::Api { .. }) {
            warn!(action, status = status.as_u16(), "Identity Toolkit call failed: {}", message);
        }
        Err(err)
    }

    /// Create an email/password account.
    pub async fn sign_up(&self, email: &str, password: &str) -> IdentityResult<AuthSession> {
        self.call(
            "signUp",
            &Credentials {
                email,
                password,
                return_secure_token: true,
            },
        )
        .await
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> IdentityResult<AuthSession> {
        self.call(
            "signInWithPassword",
            &Credentials {
                email,
                password,
                return_secure_token: true,
            },
        )
        .await
    }

    /// Ask the provider to email a password reset link.
    pub async fn send_password_reset(&self, email: &str) -> IdentityResult<()> {
        let _: serde_json::Value = self
            .call(
                "sendOobCode",
                &serde_json::json!({ "requestType": "PASSWORD_RESET", "email": email }),
            )
            .await?;
        Ok(())
    }

    /// Set a new password for the account owning `id_token`.
    pub async fn update_password(&self, id_token: &str, new_password: &str) -> IdentityResult<()> {
        let _: serde_json::Value = self
            .call(
                "update",
                &serde_json::json!({
                    "idToken": id_token,
                    "password": new_password,
                    "returnSecureToken": false
                }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_account(&self, id_token: &str) -> IdentityResult<()> {
        let _: serde_json::Value = self
            .call("delete", &serde_json::json!({ "idToken": id_token }))
            .await?;
        Ok(())
    }
}
