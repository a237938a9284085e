//! Model-level errors.

use thiserror::Error;

/// Errors raised while validating or converting model data.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },

    #[error("Unknown profile section: {0}")]
    UnknownSection(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_value(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
        }
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
