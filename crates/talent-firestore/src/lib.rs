//! Firestore REST API client and collection repositories.
//!
//! This crate provides:
//! - A REST client with token caching, emulator support and retries
//! - JSON conversion between serde models and Firestore values
//! - Typed repositories for candidates, employers, admins, jobs,
//!   match records, interviews and error logs

pub mod admin_repo;
pub mod candidate_repo;
pub mod client;
pub mod employer_repo;
pub mod error;
pub mod interview_repo;
pub mod jobs_repo;
pub mod log_repo;
pub mod matched_repo;
pub mod metrics;
pub mod patch;
pub mod query;
pub mod retry;
pub mod token_cache;
pub mod types;

#[cfg(test)]
mod repo_tests;

pub use admin_repo::AdminRepository;
pub use candidate_repo::CandidateRepository;
pub use client::{FirestoreClient, FirestoreConfig};
pub use employer_repo::EmployerRepository;
pub use error::{FirestoreError, FirestoreResult};
pub use interview_repo::InterviewRepository;
pub use jobs_repo::JobRepository;
pub use log_repo::{ErrorLogEntry, ErrorLogRepository};
pub use matched_repo::MatchedJobRepository;
pub use patch::FieldPatch;
pub use query::{clamp_page_size, SortDirection, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use retry::RetryConfig;
pub use types::{Document, FromFirestoreValue, ToFirestoreValue, Value};
