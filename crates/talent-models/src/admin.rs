//! Administrator accounts.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::user::UserType;

/// An admin document as stored in the `admins` collection.
///
/// Admins are provisioned out of band; only documents with
/// `isActive = true` grant admin access.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default = "admin_type")]
    pub user_type: UserType,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn admin_type() -> UserType {
    UserType::Admin
}

fn active() -> bool {
    true
}

impl AdminProfile {
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            user_type: UserType::Admin,
            is_active: true,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}
