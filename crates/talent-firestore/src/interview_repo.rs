//! Scheduled interviews in the `interviews` collection.

use tracing::info;

use talent_models::{normalize_email, Interview, InterviewUpdate};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::patch::FieldPatch;
use crate::types::{
    decode_documents, promote_timestamps, to_fields, Filter, StructuredQuery, ToFirestoreValue,
};

pub const INTERVIEWS_COLLECTION: &str = "interviews";

const TIMESTAMP_FIELDS: [&str; 3] = ["scheduled_time", "created_at", "updated_at"];

pub struct InterviewRepository {
    client: FirestoreClient,
}

impl InterviewRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, interview: &Interview) -> FirestoreResult<String> {
        let mut fields = to_fields(interview)?;
        fields.remove("id");
        promote_timestamps(&mut fields, &TIMESTAMP_FIELDS);
        let doc = self
            .client
            .add_document(INTERVIEWS_COLLECTION, fields)
            .await?;
        let id = doc
            .id()
            .map(str::to_string)
            .ok_or_else(|| FirestoreError::InvalidResponse("created interview has no name".into()))?;
        info!(interview_id = %id, job_id = %interview.job_id, "Scheduled interview");
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> FirestoreResult<Option<Interview>> {
        match self.client.get_document(INTERVIEWS_COLLECTION, id).await? {
            Some(doc) => Ok(Some(doc.decode(Some("id"))?)),
            None => Ok(None),
        }
    }

    /// Interviews of one candidate, optionally narrowed to one job.
    pub async fn list_by_candidate(
        &self,
        candidate_email: &str,
        job_id: Option<&str>,
    ) -> FirestoreResult<Vec<Interview>> {
        let mut filters = vec![Filter::eq(
            "candidate_email",
            normalize_email(candidate_email).to_firestore_value(),
        )];
        if let Some(job_id) = job_id.map(str::trim).filter(|j| !j.is_empty()) {
            filters.push(Filter::eq("job_id", job_id.to_firestore_value()));
        }
        let query = StructuredQuery::collection(INTERVIEWS_COLLECTION).filter(Filter::and(filters));
        let docs = self.client.run_query("", query).await?;
        decode_documents(&docs, Some("id"))
    }

    pub async fn update(&self, id: &str, update: &InterviewUpdate) -> FirestoreResult<()> {
        let present = update
            .present_fields()
            .map_err(|e| FirestoreError::serialization(e.to_string()))?;
        FieldPatch::new()
            .merge(&present, &TIMESTAMP_FIELDS)
            .touch("updated_at")
            .apply(&self.client, INTERVIEWS_COLLECTION, id)
            .await?;
        info!(interview_id = %id, fields = present.len(), "Updated interview");
        Ok(())
    }
}
