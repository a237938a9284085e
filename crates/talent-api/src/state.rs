//! Application state.

use std::sync::Arc;

use talent_firestore::{
    AdminRepository, CandidateRepository, EmployerRepository, ErrorLogRepository, FirestoreClient,
    InterviewRepository, JobRepository, MatchedJobRepository,
};
use talent_storage::S3Client;

use crate::auth::{JwksCache, TokenVerifier};
use crate::config::ApiConfig;
use crate::identity::IdentityToolkitClient;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub firestore: FirestoreClient,
    pub storage: Arc<S3Client>,
    pub identity: Arc<IdentityToolkitClient>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub candidates: Arc<CandidateRepository>,
    pub employers: Arc<EmployerRepository>,
    pub admins: Arc<AdminRepository>,
    pub jobs: Arc<JobRepository>,
    pub matched: Arc<MatchedJobRepository>,
    pub interviews: Arc<InterviewRepository>,
    pub logs: Arc<ErrorLogRepository>,
}

impl AppState {
    /// Create application state from the environment.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let firestore = FirestoreClient::from_env().await?;
        let storage = S3Client::from_env()?;
        let identity = IdentityToolkitClient::from_env()?;
        let verifier = Arc::new(JwksCache::new(firestore.project_id())?);

        Ok(Self::from_parts(config, firestore, storage, identity, verifier))
    }

    /// Assemble state from already-built collaborators.
    pub fn from_parts(
        config: ApiConfig,
        firestore: FirestoreClient,
        storage: S3Client,
        identity: IdentityToolkitClient,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            config,
            candidates: Arc::new(CandidateRepository::new(firestore.clone())),
            employers: Arc::new(EmployerRepository::new(firestore.clone())),
            admins: Arc::new(AdminRepository::new(firestore.clone())),
            jobs: Arc::new(JobRepository::new(firestore.clone())),
            matched: Arc::new(MatchedJobRepository::new(firestore.clone())),
            interviews: Arc::new(InterviewRepository::new(firestore.clone())),
            logs: Arc::new(ErrorLogRepository::new(firestore.clone())),
            firestore,
            storage: Arc::new(storage),
            identity: Arc::new(identity),
            verifier,
        }
    }
}
