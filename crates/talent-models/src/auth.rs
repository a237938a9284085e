//! Authentication request bodies.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::user::UserType;
use crate::validation::{validate_alpha_name, validate_email_format};

/// Account registration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "passwords_match"))]
pub struct SignUpRequest {
    #[validate(custom(function = "validate_email_format"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
    #[validate(custom(function = "validate_alpha_name"))]
    pub first_name: String,
    #[validate(custom(function = "validate_alpha_name"))]
    pub last_name: String,
    #[serde(default)]
    pub user_type: UserType,
    /// Employer only.
    #[serde(default)]
    pub contact_number: Option<String>,
    /// Employer only.
    #[serde(default)]
    pub company_name: Option<String>,
}

fn passwords_match(req: &SignUpRequest) -> Result<(), ValidationError> {
    match &req.confirm_password {
        Some(confirm) if confirm != &req.password => {
            Err(ValidationError::new("password_mismatch").with_message("Password mismatch".into()))
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(custom(function = "validate_email_format"))]
    pub email: String,
    #[validate(length(
        min = 8,
        message = "Password must be at least 8 characters long"
    ))]
    pub password: String,
    #[serde(default)]
    pub user_type: UserType,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct ForgotPasswordRequest {
    #[validate(custom(function = "validate_email_format"))]
    pub email: String,
}

/// Password change for the signed-in caller.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "password_changes"))]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub new_password: String,
}

fn password_changes(req: &ChangePasswordRequest) -> Result<(), ValidationError> {
    if req.current_password == req.new_password {
        Err(ValidationError::new("same_password")
            .with_message("New password must differ from the current password".into()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_request;

    fn signup() -> SignUpRequest {
        serde_json::from_value(serde_json::json!({
            "email": "jane@example.com",
            "password": "hunter22!",
            "firstName": "Jane",
            "lastName": "Doe"
        }))
        .unwrap()
    }

    #[test]
    fn test_signup_defaults_to_candidate() {
        let req = signup();
        assert_eq!(req.user_type, UserType::Candidate);
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn test_signup_password_mismatch() {
        let mut req = signup();
        req.confirm_password = Some("different1".into());
        let err = validate_request(&req).unwrap_err().to_string();
        assert!(err.contains("Password mismatch"), "{err}");
    }

    #[test]
    fn test_signup_rejects_short_password_and_bad_names() {
        let mut req = signup();
        req.password = "short".into();
        req.first_name = "J4ne".into();
        let err = validate_request(&req).unwrap_err().to_string();
        assert!(err.contains("password"), "{err}");
        assert!(err.contains("first_name"), "{err}");
    }

    #[test]
    fn test_login_invalid_email() {
        let req = LoginRequest {
            email: "not-an-email".into(),
            password: "longenough".into(),
            user_type: UserType::Employer,
        };
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn test_change_password_must_differ() {
        let req = ChangePasswordRequest {
            current_password: "samesame1".into(),
            new_password: "samesame1".into(),
        };
        let err = validate_request(&req).unwrap_err().to_string();
        assert!(err.contains("must differ"), "{err}");
    }
}
