//! Shared data models for the Talent backend.
//!
//! This crate provides Serde-serializable types for:
//! - Candidate, employer and admin profiles
//! - Job postings, match records and interviews
//! - Request bodies with their validation rules
//! - Skill matching between jobs and candidates

pub mod admin;
pub mod auth;
pub mod candidate;
pub mod employer;
pub mod error;
pub mod interview;
pub mod job;
pub mod matched;
pub mod matching;
pub mod user;
pub mod validation;

// Re-export common types
pub use admin::AdminProfile;
pub use auth::{ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, SignUpRequest};
pub use candidate::{
    default_progress_steps, Account, Award, BasicInformation, CandidateProfile, CandidateSection,
    Education, JobPreference, ProgressStep, ProgressUpdate, Project, Urls, WorkExperience,
};
pub use employer::{CompanyInfo, CompanySize, EmployerProfile, EmployerProfileUpdate, Industry};
pub use error::{ModelError, ModelResult};
pub use interview::{Interview, InterviewStatus, InterviewUpdate, NewInterview};
pub use job::{close_date_timestamp, EmploymentType, Job, JobModel, JobUpdate};
pub use matched::{
    summarize_matches, JobActionRequest, JobMatchSummary, MatchedJob, MatchedJobStatus,
    MatchedStatusUpdate, NewMatchedJob,
};
pub use matching::{match_skills, JobMatch, SkillMatch};
pub use user::{ProfileStatus, UserType};
pub use validation::{is_valid_email, normalize_email, validate_request};
