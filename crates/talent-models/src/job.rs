//! Job postings.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{ModelError, ModelResult};
use crate::validation::{validate_not_blank, validate_skills};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum EmploymentType {
    Permanent,
    Contract,
    Freelance,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::Permanent => "Permanent",
            EmploymentType::Contract => "Contract",
            EmploymentType::Freelance => "Freelance",
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Close dates are stored as timestamps at midnight UTC.
pub fn close_date_timestamp(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Body of `POST /jobs`. Accepts snake_case names and camelCase aliases.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
#[validate(schema(function = "job_salary_ordered"))]
pub struct JobModel {
    #[validate(custom(function = "validate_not_blank"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub responsibilities: Option<String>,
    #[serde(default)]
    pub qualifications: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_skills"))]
    pub skills: Vec<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub country: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(alias = "employmentType")]
    pub employment_type: EmploymentType,
    #[serde(default, alias = "experienceLevel")]
    pub experience_level: Option<String>,
    #[serde(default, alias = "salaryMin")]
    #[validate(range(min = 0, message = "cannot be negative"))]
    pub salary_min: Option<i64>,
    #[serde(default, alias = "salaryMax")]
    #[validate(range(min = 0, message = "cannot be negative"))]
    pub salary_max: Option<i64>,
    #[serde(default, alias = "applicationCloseDate")]
    pub application_close_date: Option<NaiveDate>,
}

fn job_salary_ordered(job: &JobModel) -> Result<(), ValidationError> {
    check_salary_order(job.salary_min, job.salary_max)
}

fn check_salary_order(min: Option<i64>, max: Option<i64>) -> Result<(), ValidationError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(ValidationError::new("salary_range")
            .with_message("salary_min cannot exceed salary_max".into())),
        _ => Ok(()),
    }
}

/// Partial job update. Only fields that are present are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[validate(schema(function = "update_salary_ordered"))]
pub struct JobUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_not_blank"))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsibilities: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifications: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_not_blank"))]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, alias = "employmentType", skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<EmploymentType>,
    #[serde(default, alias = "experienceLevel", skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(default, alias = "salaryMin", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "cannot be negative"))]
    pub salary_min: Option<i64>,
    #[serde(default, alias = "salaryMax", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "cannot be negative"))]
    pub salary_max: Option<i64>,
    #[serde(default, alias = "applicationCloseDate", skip_serializing_if = "Option::is_none")]
    pub application_close_date: Option<NaiveDate>,
}

fn update_salary_ordered(update: &JobUpdate) -> Result<(), ValidationError> {
    check_salary_order(update.salary_min, update.salary_max)
}

impl JobUpdate {
    /// Check the salary range the job would have after this update, taking
    /// absent bounds from the stored job.
    pub fn check_salary_against(&self, job: &Job) -> ModelResult<()> {
        let min = self.salary_min.or(job.salary_min);
        let max = self.salary_max.or(job.salary_max);
        check_salary_order(min, max).map_err(|e| {
            ModelError::validation(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            )
        })
    }

    /// Present fields keyed by stored name. The close date is rendered as
    /// an RFC 3339 midnight timestamp.
    pub fn present_fields(&self) -> ModelResult<serde_json::Map<String, serde_json::Value>> {
        let mut map = match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        if let Some(date) = self.application_close_date {
            map.insert(
                "application_close_date".to_string(),
                serde_json::to_value(close_date_timestamp(date))?,
            );
        }
        if let Some(skills) = &self.skills {
            let trimmed: Vec<String> = skills.iter().map(|s| s.trim().to_string()).collect();
            map.insert("skills".to_string(), serde_json::to_value(trimmed)?);
        }
        Ok(map)
    }
}

/// A job document as stored in the `jobs` collection.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub employer_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsibilities: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifications: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<EmploymentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_close_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Build a stored job from a validated request. The id is assigned by
    /// the store and the author comes from the verified caller.
    pub fn from_model(model: JobModel, job_id: &str, employer_id: &str) -> Self {
        let now = Utc::now();
        Self {
            job_id: job_id.to_string(),
            employer_id: employer_id.to_string(),
            title: model.title.trim().to_string(),
            description: model.description,
            responsibilities: model.responsibilities,
            qualifications: model.qualifications,
            skills: model.skills.iter().map(|s| s.trim().to_string()).collect(),
            country: model.country.trim().to_string(),
            city: model.city,
            location: model.location,
            employment_type: Some(model.employment_type),
            experience_level: model.experience_level,
            salary_min: model.salary_min,
            salary_max: model.salary_max,
            application_close_date: model.application_close_date.map(close_date_timestamp),
            created_at: Some(now),
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_request;
    use serde_json::json;

    fn model() -> JobModel {
        serde_json::from_value(json!({
            "title": "Backend Engineer",
            "country": "South Africa",
            "skills": ["Rust", " Postgres "],
            "employmentType": "Permanent",
            "salaryMin": 40000,
            "salaryMax": 60000,
            "applicationCloseDate": "2025-03-31"
        }))
        .unwrap()
    }

    #[test]
    fn test_accepts_camel_case_aliases() {
        let job = model();
        assert_eq!(job.employment_type, EmploymentType::Permanent);
        assert_eq!(job.salary_min, Some(40000));
        assert!(validate_request(&job).is_ok());
    }

    #[test]
    fn test_rejects_inverted_salary() {
        let mut job = model();
        job.salary_min = Some(90000);
        let err = validate_request(&job).unwrap_err().to_string();
        assert!(err.contains("salary_min cannot exceed salary_max"), "{err}");
    }

    #[test]
    fn test_rejects_blank_title() {
        let mut job = model();
        job.title = "  ".into();
        assert!(validate_request(&job).is_err());
    }

    #[test]
    fn test_rejects_unknown_employment_type() {
        let result = serde_json::from_value::<JobModel>(json!({
            "title": "Intern",
            "country": "Kenya",
            "employment_type": "Internship"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_model_sets_server_fields() {
        let job = Job::from_model(model(), "job-1", "employer-uid");
        assert_eq!(job.job_id, "job-1");
        assert_eq!(job.employer_id, "employer-uid");
        assert_eq!(job.skills, vec!["Rust", "Postgres"]);
        assert_eq!(
            job.application_close_date.unwrap().to_rfc3339(),
            "2025-03-31T00:00:00+00:00"
        );
        assert!(job.created_at.is_some());
    }

    #[test]
    fn test_update_present_fields() {
        let update: JobUpdate = serde_json::from_value(json!({
            "salaryMax": 70000,
            "applicationCloseDate": "2025-04-01"
        }))
        .unwrap();
        let fields = update.present_fields().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["salary_max"], 70000);
        assert!(fields["application_close_date"]
            .as_str()
            .unwrap()
            .starts_with("2025-04-01T00:00:00"));
    }

    #[test]
    fn test_partial_update_checked_against_stored_salary() {
        let job = Job::from_model(model(), "job-1", "employer-uid");

        let raise_min: JobUpdate = serde_json::from_value(json!({ "salaryMin": 90000 })).unwrap();
        assert!(validate_request(&raise_min).is_ok());
        let err = raise_min.check_salary_against(&job).unwrap_err();
        assert!(matches!(err, ModelError::Validation(ref m) if m == "salary_min cannot exceed salary_max"));

        let widen: JobUpdate = serde_json::from_value(json!({ "salaryMin": 90000, "salaryMax": 120000 })).unwrap();
        assert!(widen.check_salary_against(&job).is_ok());

        let lower_max: JobUpdate = serde_json::from_value(json!({ "salaryMax": 30000 })).unwrap();
        assert!(lower_max.check_salary_against(&job).is_err());

        let title_only: JobUpdate = serde_json::from_value(json!({ "title": "Lead" })).unwrap();
        assert!(title_only.check_salary_against(&job).is_ok());
    }
}
