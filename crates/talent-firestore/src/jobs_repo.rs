//! Job postings in the `jobs` collection.
//!
//! Pages are ordered newest first by `created_at`, with the document name
//! as tie-breaker so that the cursor position is unambiguous.

use chrono::Utc;
use tracing::{debug, info};

use talent_models::{Job, JobModel, JobUpdate};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::patch::FieldPatch;
use crate::query::{SortDirection, DOCUMENT_NAME_FIELD};
use crate::types::{
    decode_documents, promote_timestamps, to_fields, Filter, StructuredQuery, ToFirestoreValue,
    Value,
};

pub const JOBS_COLLECTION: &str = "jobs";

const TIMESTAMP_FIELDS: [&str; 3] = ["application_close_date", "created_at", "updated_at"];

pub struct JobRepository {
    client: FirestoreClient,
}

impl JobRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Store a new job authored by `employer_id` and return it with its id.
    pub async fn create(&self, employer_id: &str, model: JobModel) -> FirestoreResult<Job> {
        let job_id = uuid::Uuid::new_v4().simple().to_string();
        let job = Job::from_model(model, &job_id, employer_id);

        let mut fields = to_fields(&job)?;
        promote_timestamps(&mut fields, &TIMESTAMP_FIELDS);
        self.client
            .create_document(JOBS_COLLECTION, &job_id, fields)
            .await?;

        info!(job_id = %job_id, employer_id = %employer_id, "Created job");
        Ok(job)
    }

    pub async fn get(&self, job_id: &str) -> FirestoreResult<Option<Job>> {
        match self.client.get_document(JOBS_COLLECTION, job_id).await? {
            Some(doc) => Ok(Some(doc.decode(Some("job_id"))?)),
            None => Ok(None),
        }
    }

    /// Write the fields present in `update` and stamp `updated_at`.
    pub async fn update(&self, job_id: &str, update: &JobUpdate) -> FirestoreResult<()> {
        let present = update
            .present_fields()
            .map_err(|e| FirestoreError::serialization(e.to_string()))?;
        FieldPatch::new()
            .merge(&present, &TIMESTAMP_FIELDS)
            .set("updated_at", Utc::now().to_firestore_value())
            .apply(&self.client, JOBS_COLLECTION, job_id)
            .await?;
        info!(job_id = %job_id, fields = present.len(), "Updated job");
        Ok(())
    }

    pub async fn delete(&self, job_id: &str) -> FirestoreResult<()> {
        self.client.delete_document(JOBS_COLLECTION, job_id).await?;
        info!(job_id = %job_id, "Deleted job");
        Ok(())
    }

    /// One page of jobs, newest first, resuming after the job `start_after`.
    ///
    /// A cursor id that does not name an existing job is ignored and the
    /// first page is returned.
    pub async fn list_page(&self, limit: u32, start_after: Option<&str>) -> FirestoreResult<Vec<Job>> {
        let mut query = StructuredQuery::collection(JOBS_COLLECTION)
            .order_by("created_at", SortDirection::Descending)
            .order_by(DOCUMENT_NAME_FIELD, SortDirection::Descending)
            .limit(limit);

        if let Some(cursor_id) = start_after.filter(|id| !id.trim().is_empty()) {
            match self.cursor_values(cursor_id).await? {
                Some(values) => query = query.start_after(values),
                None => debug!(cursor = %cursor_id, "Ignoring unknown job cursor"),
            }
        }

        let docs = self.client.run_query("", query).await?;
        decode_documents(&docs, Some("job_id"))
    }

    pub async fn list_by_employer(&self, employer_id: &str) -> FirestoreResult<Vec<Job>> {
        let query = StructuredQuery::collection(JOBS_COLLECTION)
            .filter(Filter::eq("employer_id", employer_id.to_firestore_value()));
        let docs = self.client.run_query("", query).await?;
        decode_documents(&docs, Some("job_id"))
    }

    pub async fn list_all(&self) -> FirestoreResult<Vec<Job>> {
        let docs = self.client.list_all_documents(JOBS_COLLECTION).await?;
        decode_documents(&docs, Some("job_id"))
    }

    /// Order-by values of the cursor job: its creation time and name.
    async fn cursor_values(&self, job_id: &str) -> FirestoreResult<Option<Vec<Value>>> {
        let Some(doc) = self.client.get_document(JOBS_COLLECTION, job_id).await? else {
            return Ok(None);
        };
        let created_at = match doc.field("created_at") {
            Some(ts @ Value::TimestampValue(_)) => ts.clone(),
            _ => return Ok(None),
        };
        let name = doc
            .name
            .clone()
            .unwrap_or_else(|| self.client.full_document_name(JOBS_COLLECTION, job_id));
        Ok(Some(vec![created_at, Value::ReferenceValue(name)]))
    }
}
