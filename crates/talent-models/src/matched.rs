//! Candidate-to-job match records and their lifecycle.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ModelError;
use crate::validation::{validate_email_format, validate_not_blank};

/// Where a match record is in the hiring pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchedJobStatus {
    #[default]
    Pending,
    Viewed,
    Accepted,
    Declined,
    Interviewed,
    Offered,
    Rejected,
    Hired,
}

impl MatchedJobStatus {
    pub const ALL: [MatchedJobStatus; 8] = [
        MatchedJobStatus::Pending,
        MatchedJobStatus::Viewed,
        MatchedJobStatus::Accepted,
        MatchedJobStatus::Declined,
        MatchedJobStatus::Interviewed,
        MatchedJobStatus::Offered,
        MatchedJobStatus::Rejected,
        MatchedJobStatus::Hired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchedJobStatus::Pending => "pending",
            MatchedJobStatus::Viewed => "viewed",
            MatchedJobStatus::Accepted => "accepted",
            MatchedJobStatus::Declined => "declined",
            MatchedJobStatus::Interviewed => "interviewed",
            MatchedJobStatus::Offered => "offered",
            MatchedJobStatus::Rejected => "rejected",
            MatchedJobStatus::Hired => "hired",
        }
    }
}

impl FromStr for MatchedJobStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        MatchedJobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == lowered)
            .ok_or_else(|| ModelError::invalid_value("status", s))
    }
}

impl fmt::Display for MatchedJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /matched`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct NewMatchedJob {
    #[validate(custom(function = "validate_email_format"))]
    pub candidate_email: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub job_id: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub job_title: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub status: Option<MatchedJobStatus>,
    #[serde(default)]
    pub matched_skills: Vec<String>,
}

/// A match document as stored in the `matched_jobs` collection.
///
/// `status` stays a raw string so that records written with an
/// unexpected value still load and can be reported.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MatchedJob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub candidate_email: String,
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub job_accepted: bool,
    #[serde(default)]
    pub matched_skills: Vec<String>,
}

impl MatchedJob {
    pub fn from_new(new: NewMatchedJob, candidate_email: String) -> Self {
        let status = new.status.unwrap_or_default();
        Self {
            id: None,
            candidate_email,
            job_id: new.job_id.trim().to_string(),
            job_title: new.job_title.trim().to_string(),
            company_name: new.company_name,
            description: new.description,
            tags: new.tags,
            salary: new.salary,
            matched_on: Some(Utc::now()),
            status: Some(status.as_str().to_string()),
            job_accepted: status == MatchedJobStatus::Accepted,
            matched_skills: new.matched_skills,
        }
    }

    /// Parsed status; a missing status reads as pending.
    pub fn parsed_status(&self) -> Result<MatchedJobStatus, ModelError> {
        match &self.status {
            None => Ok(MatchedJobStatus::Pending),
            Some(raw) => raw.parse(),
        }
    }
}

/// Body of `accept-job` and `decline-job`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct JobActionRequest {
    #[validate(custom(function = "validate_email_format"))]
    pub candidate_email: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub job_id: String,
}

/// Body of `PUT /matched/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MatchedStatusUpdate {
    pub status: MatchedJobStatus,
}

/// Per-title aggregate for the admin summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JobMatchSummary {
    pub total: u64,
    pub statuses: BTreeMap<String, u64>,
}

impl Default for JobMatchSummary {
    fn default() -> Self {
        Self {
            total: 0,
            statuses: MatchedJobStatus::ALL
                .iter()
                .map(|s| (s.as_str().to_string(), 0))
                .collect(),
        }
    }
}

/// Count matches per job title and status.
///
/// Every known status is present with zero counts. Unknown statuses are
/// counted under their raw value, a missing status counts as pending, and
/// records without a title are skipped.
pub fn summarize_matches<'a, I>(records: I) -> BTreeMap<String, JobMatchSummary>
where
    I: IntoIterator<Item = &'a MatchedJob>,
{
    let mut summary: BTreeMap<String, JobMatchSummary> = BTreeMap::new();
    for record in records {
        let title = record.job_title.trim();
        if title.is_empty() {
            continue;
        }
        let status = match record.parsed_status() {
            Ok(status) => status.as_str().to_string(),
            Err(_) => record.status.clone().unwrap_or_default(),
        };
        let entry = summary.entry(title.to_string()).or_default();
        entry.total += 1;
        *entry.statuses.entry(status).or_insert(0) += 1;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, status: Option<&str>) -> MatchedJob {
        MatchedJob {
            id: None,
            candidate_email: "c@example.com".into(),
            job_id: "job".into(),
            job_title: title.into(),
            company_name: "Acme".into(),
            description: None,
            tags: vec![],
            salary: None,
            matched_on: None,
            status: status.map(String::from),
            job_accepted: false,
            matched_skills: vec![],
        }
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("Declined".parse::<MatchedJobStatus>().unwrap(), MatchedJobStatus::Declined);
        assert!("ghosted".parse::<MatchedJobStatus>().is_err());
    }

    #[test]
    fn test_summary_seeds_all_statuses() {
        let records = vec![
            record("Engineer", Some("accepted")),
            record("Engineer", None),
            record("Engineer", Some("Declined")),
            record("Designer", Some("ghosted")),
            record("  ", Some("hired")),
        ];
        let summary = summarize_matches(&records);
        assert_eq!(summary.len(), 2);

        let engineer = &summary["Engineer"];
        assert_eq!(engineer.total, 3);
        assert_eq!(engineer.statuses["accepted"], 1);
        assert_eq!(engineer.statuses["pending"], 1);
        assert_eq!(engineer.statuses["declined"], 1);
        assert_eq!(engineer.statuses["hired"], 0);
        assert_eq!(engineer.statuses.len(), 8);

        let designer = &summary["Designer"];
        assert_eq!(designer.total, 1);
        assert_eq!(designer.statuses["ghosted"], 1);
        assert_eq!(designer.statuses.len(), 9);
    }

    #[test]
    fn test_from_new_sets_server_fields() {
        let new: NewMatchedJob = serde_json::from_value(serde_json::json!({
            "candidate_email": "c@example.com",
            "job_id": "job-1",
            "job_title": "Engineer",
            "company_name": "Acme",
            "status": "accepted"
        }))
        .unwrap();
        let matched = MatchedJob::from_new(new, "c@example.com".into());
        assert!(matched.matched_on.is_some());
        assert_eq!(matched.status.as_deref(), Some("accepted"));
        assert!(matched.job_accepted);
    }
}
