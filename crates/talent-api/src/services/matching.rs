//! Candidate job matching across the jobs and employer collections.

use std::collections::HashMap;

use tracing::{debug, info};

use talent_models::{match_skills, CandidateProfile, Job, JobMatch, MatchedJob, NewMatchedJob};

use crate::error::ApiResult;
use crate::state::AppState;

/// A job that overlaps the candidate's skills.
#[derive(Debug, Clone)]
pub struct MatchedPosting {
    pub job: Job,
    pub company_name: String,
    pub result: JobMatch,
}

async fn company_names(state: &AppState) -> ApiResult<HashMap<String, String>> {
    Ok(state
        .employers
        .list_all()
        .await?
        .into_iter()
        .filter_map(|e| Some((e.uid?, e.company_name.unwrap_or_default())))
        .collect())
}

/// Match the candidate against every job, in store order.
///
/// Jobs whose employer's company the candidate hides are skipped.
pub async fn compute_matches(state: &AppState, candidate: &CandidateProfile) -> ApiResult<Vec<MatchedPosting>> {
    let jobs = state.jobs.list_all().await?;
    let companies = company_names(state).await?;

    let mut matches = Vec::new();
    for job in jobs {
        let company_name = companies.get(&job.employer_id).cloned().unwrap_or_default();
        if !company_name.is_empty() && candidate.account.hides(&company_name) {
            debug!(job_id = %job.job_id, "Skipping job from hidden company");
            continue;
        }

        let skills = match_skills(&job.skills, &candidate.skills);
        if !skills.is_match {
            continue;
        }
        let result = JobMatch {
            job_id: job.job_id.clone(),
            job_title: job.title.clone(),
            employer_id: job.employer_id.clone(),
            matched_skills: skills.matched,
            missing_skills: skills.missing,
        };
        matches.push(MatchedPosting {
            job,
            company_name,
            result,
        });
    }
    Ok(matches)
}

fn salary_label(job: &Job) -> Option<String> {
    match (job.salary_min, job.salary_max) {
        (Some(min), Some(max)) => Some(format!("{min} - {max}")),
        (Some(min), None) => Some(format!("{min}+")),
        (None, Some(max)) => Some(format!("up to {max}")),
        (None, None) => None,
    }
}

/// Store a `matched_jobs` record for each match the candidate does not
/// already have. Returns the ids of the created records.
pub async fn persist_matches(
    state: &AppState,
    candidate_email: &str,
    matches: Vec<MatchedPosting>,
) -> ApiResult<Vec<String>> {
    let mut created = Vec::new();
    for posting in matches {
        if state
            .matched
            .find_by_candidate_and_job(candidate_email, &posting.job.job_id)
            .await?
            .is_some()
        {
            continue;
        }

        let salary = salary_label(&posting.job);
        let new = NewMatchedJob {
            candidate_email: candidate_email.to_string(),
            job_id: posting.job.job_id,
            job_title: posting.job.title,
            company_name: posting.company_name,
            description: posting.job.description,
            tags: posting.job.skills,
            salary,
            status: None,
            matched_skills: posting.result.matched_skills,
        };
        let record = MatchedJob::from_new(new, candidate_email.to_string());
        created.push(state.matched.create(&record).await?);
    }

    info!(candidate = %candidate_email, created = created.len(), "Persisted job matches");
    Ok(created)
}
