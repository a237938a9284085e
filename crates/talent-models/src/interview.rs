//! Interview scheduling.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ModelResult;
use crate::validation::{validate_email_format, validate_not_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

/// Body of `POST /interviews`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct NewInterview {
    #[validate(custom(function = "validate_email_format"))]
    pub candidate_email: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub job_id: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub company_name: String,
    /// e.g. "HR Interview", "Technical Interview".
    #[validate(custom(function = "validate_not_blank"))]
    pub interview_stage: String,
    pub scheduled_time: DateTime<Utc>,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// An interview document as stored in the `interviews` collection.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Interview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub candidate_email: String,
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub interview_stage: String,
    pub scheduled_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: InterviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Interview {
    pub fn schedule(new: NewInterview, candidate_email: String) -> Self {
        Self {
            id: None,
            candidate_email,
            job_id: new.job_id.trim().to_string(),
            company_name: new.company_name.trim().to_string(),
            interview_stage: new.interview_stage.trim().to_string(),
            scheduled_time: Some(new.scheduled_time),
            status: InterviewStatus::Scheduled,
            feedback: new.feedback,
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }
}

/// Body of `PUT /interviews/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, JsonSchema)]
pub struct InterviewUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InterviewStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_not_blank"))]
    pub interview_stage: Option<String>,
}

impl InterviewUpdate {
    pub fn present_fields(&self) -> ModelResult<serde_json::Map<String, serde_json::Value>> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            _ => Ok(serde_json::Map::new()),
        }
    }
}
