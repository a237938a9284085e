//! Candidate/job match records in the `matched_jobs` collection.

use std::collections::BTreeMap;

use tracing::info;

use talent_models::{normalize_email, summarize_matches, JobMatchSummary, MatchedJob, MatchedJobStatus};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::patch::FieldPatch;
use crate::types::{
    decode_documents, promote_timestamps, to_fields, Filter, StructuredQuery, ToFirestoreValue,
};

pub const MATCHED_JOBS_COLLECTION: &str = "matched_jobs";

pub struct MatchedJobRepository {
    client: FirestoreClient,
}

impl MatchedJobRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Store a match record and return its generated id.
    pub async fn create(&self, record: &MatchedJob) -> FirestoreResult<String> {
        let mut fields = to_fields(record)?;
        fields.remove("id");
        promote_timestamps(&mut fields, &["matched_on"]);
        let doc = self
            .client
            .add_document(MATCHED_JOBS_COLLECTION, fields)
            .await?;
        let id = doc
            .id()
            .map(str::to_string)
            .ok_or_else(|| FirestoreError::InvalidResponse("created match has no name".into()))?;
        info!(match_id = %id, job_id = %record.job_id, "Saved matched job");
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> FirestoreResult<Option<MatchedJob>> {
        match self.client.get_document(MATCHED_JOBS_COLLECTION, id).await? {
            Some(doc) => Ok(Some(doc.decode(Some("id"))?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_candidate_and_job(
        &self,
        candidate_email: &str,
        job_id: &str,
    ) -> FirestoreResult<Option<MatchedJob>> {
        let query = StructuredQuery::collection(MATCHED_JOBS_COLLECTION)
            .filter(Filter::and(vec![
                Filter::eq(
                    "candidate_email",
                    normalize_email(candidate_email).to_firestore_value(),
                ),
                Filter::eq("job_id", job_id.trim().to_firestore_value()),
            ]))
            .limit(1);
        let docs = self.client.run_query("", query).await?;
        match docs.first() {
            Some(doc) => Ok(Some(doc.decode(Some("id"))?)),
            None => Ok(None),
        }
    }

    pub async fn list_by_candidate(&self, candidate_email: &str) -> FirestoreResult<Vec<MatchedJob>> {
        let query = StructuredQuery::collection(MATCHED_JOBS_COLLECTION).filter(Filter::eq(
            "candidate_email",
            normalize_email(candidate_email).to_firestore_value(),
        ));
        let docs = self.client.run_query("", query).await?;
        decode_documents(&docs, Some("id"))
    }

    pub async fn list_all(&self) -> FirestoreResult<Vec<MatchedJob>> {
        let docs = self
            .client
            .list_all_documents(MATCHED_JOBS_COLLECTION)
            .await?;
        decode_documents(&docs, Some("id"))
    }

    /// Move a record to `status`. `job_accepted` follows the status.
    pub async fn set_status(&self, id: &str, status: MatchedJobStatus) -> FirestoreResult<()> {
        FieldPatch::new()
            .set("status", status.as_str().to_firestore_value())
            .set(
                "job_accepted",
                (status == MatchedJobStatus::Accepted).to_firestore_value(),
            )
            .apply(&self.client, MATCHED_JOBS_COLLECTION, id)
            .await?;
        info!(match_id = %id, status = %status, "Updated matched job status");
        Ok(())
    }

    /// Per-title counts over every record.
    pub async fn summary(&self) -> FirestoreResult<BTreeMap<String, JobMatchSummary>> {
        let records = self.list_all().await?;
        Ok(summarize_matches(&records))
    }
}
