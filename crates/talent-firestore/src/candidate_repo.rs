//! Candidate profiles in the `candidate` collection, keyed by auth uid.

use std::collections::BTreeMap;

use tracing::info;

use talent_models::{
    normalize_email, BasicInformation, CandidateProfile, CandidateSection, ProfileStatus,
    ProgressStep,
};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::patch::FieldPatch;
use crate::types::{
    decode_documents, json_to_value, promote_timestamps, to_fields, Filter, StructuredQuery,
    ToFirestoreValue, Value,
};

pub const CANDIDATE_COLLECTION: &str = "candidate";

const EMAIL_FIELD: &str = "basicInfo.email";

pub struct CandidateRepository {
    client: FirestoreClient,
}

impl CandidateRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &str) -> FirestoreResult<Option<CandidateProfile>> {
        match self.client.get_document(CANDIDATE_COLLECTION, id).await? {
            Some(doc) => Ok(Some(doc.decode(Some("id"))?)),
            None => Ok(None),
        }
    }

    /// Look up a candidate by the email stored in `basicInfo.email`.
    pub async fn find_by_email(&self, email: &str) -> FirestoreResult<Option<CandidateProfile>> {
        let email = normalize_email(email);
        let query = StructuredQuery::collection(CANDIDATE_COLLECTION)
            .filter(Filter::eq(EMAIL_FIELD, email.to_firestore_value()))
            .limit(1);
        let docs = self.client.run_query("", query).await?;
        match docs.first() {
            Some(doc) => Ok(Some(doc.decode(Some("id"))?)),
            None => Ok(None),
        }
    }

    /// Create the profile document for a new account.
    pub async fn create(&self, uid: &str, profile: &CandidateProfile) -> FirestoreResult<()> {
        let mut fields = to_fields(profile)?;
        fields.remove("id");
        promote_timestamps(&mut fields, &["createdAt", "updatedAt"]);
        self.client
            .create_document(CANDIDATE_COLLECTION, uid, fields)
            .await?;
        info!(uid = %uid, "Created candidate profile");
        Ok(())
    }

    /// Replace `basicInfo`, keeping the stored email.
    pub async fn update_basic_info(
        &self,
        id: &str,
        mut basic_info: BasicInformation,
    ) -> FirestoreResult<()> {
        let existing = self
            .get(id)
            .await?
            .ok_or_else(|| FirestoreError::not_found(format!("{}/{}", CANDIDATE_COLLECTION, id)))?;
        basic_info.email = existing.basic_info.email;

        FieldPatch::new()
            .set_json("basicInfo", &serde_json::to_value(&basic_info)?)
            .set_entry("progressSteps", "Basic Information", completed_step())
            .touch("updatedAt")
            .apply(&self.client, CANDIDATE_COLLECTION, id)
            .await?;
        Ok(())
    }

    /// Replace the whole `progressSteps` map.
    pub async fn update_progress(
        &self,
        id: &str,
        steps: &BTreeMap<String, ProgressStep>,
    ) -> FirestoreResult<()> {
        FieldPatch::new()
            .set_json("progressSteps", &serde_json::to_value(steps)?)
            .touch("updatedAt")
            .apply(&self.client, CANDIDATE_COLLECTION, id)
            .await?;
        Ok(())
    }

    /// Replace one profile section with an already validated body and mark
    /// its onboarding step complete.
    pub async fn update_section(
        &self,
        id: &str,
        section: CandidateSection,
        body: &serde_json::Value,
    ) -> FirestoreResult<()> {
        let mut patch = FieldPatch::new().set_json(section.field_name(), body);
        if let Some(step) = section.progress_step() {
            patch = patch.set_entry("progressSteps", step, completed_step());
        }
        patch
            .touch("updatedAt")
            .apply(&self.client, CANDIDATE_COLLECTION, id)
            .await?;
        info!(candidate_id = %id, section = %section, "Updated candidate section");
        Ok(())
    }

    pub async fn set_profile_picture(&self, id: &str, key: &str) -> FirestoreResult<()> {
        self.set_string(id, "profilePicture", key).await
    }

    pub async fn set_resume(&self, id: &str, key: &str) -> FirestoreResult<()> {
        self.set_string(id, "resume", key).await
    }

    pub async fn set_status(&self, id: &str, status: ProfileStatus) -> FirestoreResult<()> {
        self.set_string(id, "status", status.as_str()).await
    }

    pub async fn list_all(&self) -> FirestoreResult<Vec<CandidateProfile>> {
        let docs = self.client.list_all_documents(CANDIDATE_COLLECTION).await?;
        decode_documents(&docs, Some("id"))
    }

    async fn set_string(&self, id: &str, field: &str, value: &str) -> FirestoreResult<()> {
        FieldPatch::new()
            .set(field, value.to_firestore_value())
            .touch("updatedAt")
            .apply(&self.client, CANDIDATE_COLLECTION, id)
            .await?;
        Ok(())
    }
}

fn completed_step() -> Value {
    json_to_value(&serde_json::json!({ "done": true, "percentage": 100 }))
}
