//! Employer profiles in the `employer` collection, keyed by auth uid.

use tracing::info;

use talent_models::{normalize_email, CompanyInfo, EmployerProfile, EmployerProfileUpdate, ProfileStatus};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::patch::FieldPatch;
use crate::types::{
    decode_documents, promote_timestamps, to_fields, Filter, StructuredQuery, ToFirestoreValue,
};

pub const EMPLOYER_COLLECTION: &str = "employer";

pub struct EmployerRepository {
    client: FirestoreClient,
}

impl EmployerRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, uid: &str) -> FirestoreResult<Option<EmployerProfile>> {
        match self.client.get_document(EMPLOYER_COLLECTION, uid).await? {
            Some(doc) => Ok(Some(doc.decode(Some("uid"))?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> FirestoreResult<Option<EmployerProfile>> {
        let query = StructuredQuery::collection(EMPLOYER_COLLECTION)
            .filter(Filter::eq("email", normalize_email(email).to_firestore_value()))
            .limit(1);
        let docs = self.client.run_query("", query).await?;
        match docs.first() {
            Some(doc) => Ok(Some(doc.decode(Some("uid"))?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, uid: &str, profile: &EmployerProfile) -> FirestoreResult<()> {
        let mut fields = to_fields(profile)?;
        fields.insert("uid".to_string(), uid.to_firestore_value());
        promote_timestamps(&mut fields, &["createdAt", "updatedAt"]);
        self.client
            .create_document(EMPLOYER_COLLECTION, uid, fields)
            .await?;
        info!(uid = %uid, "Created employer profile");
        Ok(())
    }

    pub async fn update_company_info(&self, uid: &str, info: CompanyInfo) -> FirestoreResult<()> {
        self.merge(uid, &EmployerProfileUpdate::from(info)).await
    }

    /// Write only the fields present in `update`.
    pub async fn merge(&self, uid: &str, update: &EmployerProfileUpdate) -> FirestoreResult<()> {
        let present = update
            .present_fields()
            .map_err(|e| FirestoreError::serialization(e.to_string()))?;
        FieldPatch::new()
            .merge(&present, &[])
            .touch("updatedAt")
            .apply(&self.client, EMPLOYER_COLLECTION, uid)
            .await?;
        info!(uid = %uid, fields = present.len(), "Merged employer profile");
        Ok(())
    }

    pub async fn set_logo(&self, uid: &str, key: &str) -> FirestoreResult<()> {
        FieldPatch::new()
            .set("logo", key.to_firestore_value())
            .touch("updatedAt")
            .apply(&self.client, EMPLOYER_COLLECTION, uid)
            .await?;
        Ok(())
    }

    pub async fn set_status(&self, uid: &str, status: ProfileStatus) -> FirestoreResult<()> {
        FieldPatch::new()
            .set("status", status.as_str().to_firestore_value())
            .touch("updatedAt")
            .apply(&self.client, EMPLOYER_COLLECTION, uid)
            .await?;
        Ok(())
    }

    pub async fn list_all(&self) -> FirestoreResult<Vec<EmployerProfile>> {
        let docs = self.client.list_all_documents(EMPLOYER_COLLECTION).await?;
        decode_documents(&docs, Some("uid"))
    }
}
