//! Field validators shared by the request models.
//!
//! The functions with a `Result<(), ValidationError>` signature plug into
//! `#[validate(custom(function = "..."))]`. [`validate_request`] runs the
//! derived rules and flattens the failures into one readable message.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::{ModelError, ModelResult};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").expect("valid email regex")
});

static ALPHA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").expect("valid name regex"));

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Check an address against the accepted email shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

/// Trim and lower-case an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email_format(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(error("email", "value is not a valid email address"))
    }
}

/// Names must be non-blank and purely alphabetic.
pub fn validate_alpha_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(error("blank", "cannot be empty"));
    }
    if !ALPHA_REGEX.is_match(name) {
        return Err(error(
            "alphabetic",
            "must contain only alphabetic characters",
        ));
    }
    Ok(())
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", "cannot be empty"))
    } else {
        Ok(())
    }
}

/// Accept only absolute http(s) URLs with a host.
pub fn validate_http_url(value: &str) -> Result<(), ValidationError> {
    match Url::parse(value.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => Ok(()),
        _ => Err(error("url", "must be a valid http(s) URL")),
    }
}

pub fn validate_skills(skills: &[String]) -> Result<(), ValidationError> {
    if skills.iter().any(|s| s.trim().is_empty()) {
        Err(error("blank_skill", "skills cannot contain empty entries"))
    } else {
        Ok(())
    }
}

/// Run the derived validation rules and collapse any failures into a
/// single [`ModelError::Validation`].
pub fn validate_request<T: Validate>(value: &T) -> ModelResult<()> {
    value
        .validate()
        .map_err(|e| ModelError::Validation(describe_errors(&e)))
}

/// Render validation failures as `field: message` pairs, sorted by path.
pub fn describe_errors(errors: &ValidationErrors) -> String {
    let mut lines = Vec::new();
    collect(errors, "", &mut lines);
    lines.sort();
    lines.join("; ")
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let field: &str = field.as_ref();
        let path = if field == "__all__" {
            prefix.to_string()
        } else if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed '{}' check", err.code));
                    if path.is_empty() {
                        out.push(message);
                    } else {
                        out.push(format!("{path}: {message}"));
                    }
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}
