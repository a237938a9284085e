//! Skill overlap between a job and a candidate.

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Outcome of comparing one job's skills with one candidate's skills.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SkillMatch {
    /// Job skills the candidate has, in job order and job spelling.
    pub matched: Vec<String>,
    /// Job skills the candidate lacks.
    pub missing: Vec<String>,
    pub is_match: bool,
}

fn fold(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// Single pass over the job's skills with a set lookup per skill.
///
/// Comparison ignores case and surrounding whitespace. A job with no
/// skills never matches.
pub fn match_skills<J, C>(job_skills: &[J], candidate_skills: &[C]) -> SkillMatch
where
    J: AsRef<str>,
    C: AsRef<str>,
{
    let have: HashSet<String> = candidate_skills
        .iter()
        .map(|s| fold(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect();

    let mut result = SkillMatch::default();
    for skill in job_skills {
        let skill = skill.as_ref();
        let folded = fold(skill);
        if folded.is_empty() {
            continue;
        }
        if have.contains(&folded) {
            result.matched.push(skill.trim().to_string());
        } else {
            result.missing.push(skill.trim().to_string());
        }
    }
    result.is_match = !result.matched.is_empty();
    result
}

/// One row of the candidate job-matches response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JobMatch {
    pub job_id: String,
    pub job_title: String,
    pub employer_id: String,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}
