//! Candidate profile documents and the section payloads that edit them.
//!
//! A candidate profile lives in the `candidate` collection keyed by the
//! auth uid. It is built up section by section from the onboarding flow;
//! each section has its own validated request type.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{ModelError, ModelResult};
use crate::user::{ProfileStatus, UserType};
use crate::validation::{
    validate_email_format, validate_http_url, validate_not_blank, validate_request,
    validate_skills,
};

/// Onboarding steps tracked in `progressSteps`.
pub const PROGRESS_STEP_NAMES: [&str; 7] = [
    "Basic Information",
    "Education",
    "Work Experience",
    "Job Preference",
    "Skills",
    "Projects",
    "Awards",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Urls {
    #[validate(custom(function = "validate_http_url"))]
    pub linked_in: Option<String>,
    #[validate(custom(function = "validate_http_url"))]
    pub github: Option<String>,
}

/// Personal details shown at the top of a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicInformation {
    #[validate(custom(function = "validate_not_blank"))]
    pub first_name: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub last_name: String,
    #[validate(custom(function = "validate_email_format"))]
    pub email: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub urls: Option<Urls>,
}

impl BasicInformation {
    /// Skeleton written at sign-up, before the candidate fills in details.
    pub fn from_signup(first_name: &str, last_name: &str, email: &str) -> Self {
        Self {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[validate(custom(function = "validate_not_blank"))]
    pub institution: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub qualification: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    #[validate(custom(function = "validate_not_blank"))]
    pub organization: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub job_title: String,
    pub start_date: String,
    /// `None` for a current position.
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "salary_expectation_ordered"))]
pub struct JobPreference {
    #[serde(rename = "type")]
    pub job_type: String,
    #[validate(range(min = 0, message = "cannot be negative"))]
    pub min_salary: i64,
    #[validate(range(min = 0, message = "cannot be negative"))]
    pub max_salary: i64,
    pub work_location: String,
    pub relocate: String,
    pub desired_role: String,
    pub experience: String,
    pub ideal_job: String,
}

fn salary_expectation_ordered(pref: &JobPreference) -> Result<(), ValidationError> {
    if pref.min_salary > pref.max_salary {
        Err(ValidationError::new("salary_range")
            .with_message("minSalary cannot exceed maxSalary".into()))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
pub struct Project {
    #[validate(custom(function = "validate_not_blank"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub github: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
pub struct Award {
    #[validate(custom(function = "validate_not_blank"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
}

/// Visibility settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    pub actively_looking: bool,
    /// Company names whose jobs are hidden from this candidate.
    pub hide_from_companies: Vec<String>,
}

impl Account {
    pub fn hides(&self, company_name: &str) -> bool {
        let company = company_name.trim().to_lowercase();
        self.hide_from_companies
            .iter()
            .any(|c| c.trim().to_lowercase() == company)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
pub struct ProgressStep {
    pub done: bool,
    #[validate(range(min = 0, max = 100, message = "must be between 0 and 100"))]
    pub percentage: i32,
}

/// Body of `save-progress`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProgressUpdate {
    pub steps: BTreeMap<String, ProgressStep>,
}

impl ProgressUpdate {
    pub fn validate(&self) -> ModelResult<()> {
        for (name, step) in &self.steps {
            if name.trim().is_empty() {
                return Err(ModelError::validation("steps: step name cannot be empty"));
            }
            validate_request(step)
                .map_err(|e| ModelError::validation(format!("steps.{name}.{e}")))?;
        }
        Ok(())
    }
}

/// All onboarding steps, none started.
pub fn default_progress_steps() -> BTreeMap<String, ProgressStep> {
    PROGRESS_STEP_NAMES
        .iter()
        .map(|name| (name.to_string(), ProgressStep::default()))
        .collect()
}

/// A candidate document as stored in the `candidate` collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateProfile {
    /// Document id (the auth uid). Not stored as a field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_type: UserType,
    pub status: ProfileStatus,
    pub basic_info: BasicInformation,
    pub education: Vec<Education>,
    pub work_experience: Vec<WorkExperience>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_preference: Option<JobPreference>,
    pub skills: Vec<String>,
    pub projects: Vec<Project>,
    pub awards: Vec<Award>,
    pub account: Account,
    pub progress_steps: BTreeMap<String, ProgressStep>,
    /// Object key of the profile picture.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    /// Object key of the uploaded resume.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CandidateProfile {
    /// New pending profile created at sign-up.
    pub fn new(basic_info: BasicInformation) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            user_type: UserType::Candidate,
            status: ProfileStatus::Pending,
            basic_info,
            progress_steps: default_progress_steps(),
            created_at: Some(now),
            updated_at: Some(now),
            ..Default::default()
        }
    }

    pub fn email(&self) -> &str {
        &self.basic_info.email
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.basic_info.first_name, self.basic_info.last_name)
            .trim()
            .to_string()
    }
}

/// Independently editable profile sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateSection {
    Education,
    WorkExperience,
    JobPreference,
    Skills,
    Projects,
    Awards,
    Account,
}

impl CandidateSection {
    /// Path segment used in `/candidate/{id}/{section}`.
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateSection::Education => "education",
            CandidateSection::WorkExperience => "work-experience",
            CandidateSection::JobPreference => "job-preference",
            CandidateSection::Skills => "skills",
            CandidateSection::Projects => "projects",
            CandidateSection::Awards => "awards",
            CandidateSection::Account => "account",
        }
    }

    /// Document field the section is stored under.
    pub fn field_name(&self) -> &'static str {
        match self {
            CandidateSection::Education => "education",
            CandidateSection::WorkExperience => "workExperience",
            CandidateSection::JobPreference => "jobPreference",
            CandidateSection::Skills => "skills",
            CandidateSection::Projects => "projects",
            CandidateSection::Awards => "awards",
            CandidateSection::Account => "account",
        }
    }

    /// Progress step completed by saving this section, if any.
    pub fn progress_step(&self) -> Option<&'static str> {
        match self {
            CandidateSection::Education => Some("Education"),
            CandidateSection::WorkExperience => Some("Work Experience"),
            CandidateSection::JobPreference => Some("Job Preference"),
            CandidateSection::Skills => Some("Skills"),
            CandidateSection::Projects => Some("Projects"),
            CandidateSection::Awards => Some("Awards"),
            CandidateSection::Account => None,
        }
    }

    /// Parse and validate a section body, returning its normalized JSON.
    pub fn parse_body(&self, body: serde_json::Value) -> ModelResult<serde_json::Value> {
        match self {
            CandidateSection::Education => normalize_list::<Education>(body),
            CandidateSection::WorkExperience => normalize_list::<WorkExperience>(body),
            CandidateSection::Projects => normalize_list::<Project>(body),
            CandidateSection::Awards => normalize_list::<Award>(body),
            CandidateSection::JobPreference => normalize_one::<JobPreference>(body),
            CandidateSection::Account => normalize_one::<Account>(body),
            CandidateSection::Skills => {
                let skills: Vec<String> = serde_json::from_value(body)
                    .map_err(|e| ModelError::validation(format!("skills: {e}")))?;
                validate_skills(&skills).map_err(|e| {
                    ModelError::validation(format!(
                        "skills: {}",
                        e.message.unwrap_or_else(|| e.code.clone())
                    ))
                })?;
                let skills: Vec<String> = skills.iter().map(|s| s.trim().to_string()).collect();
                Ok(serde_json::to_value(skills)?)
            }
        }
    }
}

fn normalize_one<T>(body: serde_json::Value) -> ModelResult<serde_json::Value>
where
    T: Serialize + serde::de::DeserializeOwned + Validate,
{
    let value: T = serde_json::from_value(body).map_err(|e| ModelError::validation(e.to_string()))?;
    validate_request(&value)?;
    Ok(serde_json::to_value(value)?)
}

fn normalize_list<T>(body: serde_json::Value) -> ModelResult<serde_json::Value>
where
    T: Serialize + serde::de::DeserializeOwned + Validate,
{
    // A single entry is accepted and stored as a one-element list.
    let body = match body {
        serde_json::Value::Array(_) => body,
        other => serde_json::Value::Array(vec![other]),
    };
    let values: Vec<T> =
        serde_json::from_value(body).map_err(|e| ModelError::validation(e.to_string()))?;
    for (index, value) in values.iter().enumerate() {
        validate_request(value).map_err(|e| ModelError::validation(format!("[{index}] {e}")))?;
    }
    Ok(serde_json::to_value(values)?)
}

impl FromStr for CandidateSection {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "education" => Ok(CandidateSection::Education),
            "work-experience" | "workExperience" => Ok(CandidateSection::WorkExperience),
            "job-preference" | "jobPreference" => Ok(CandidateSection::JobPreference),
            "skills" => Ok(CandidateSection::Skills),
            "projects" => Ok(CandidateSection::Projects),
            "awards" => Ok(CandidateSection::Awards),
            "account" => Ok(CandidateSection::Account),
            other => Err(ModelError::UnknownSection(other.to_string())),
        }
    }
}

impl fmt::Display for CandidateSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
