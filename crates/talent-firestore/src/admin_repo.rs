//! Administrator accounts in the `admins` collection, keyed by auth uid.

use talent_models::AdminProfile;

use crate::client::FirestoreClient;
use crate::error::FirestoreResult;
use crate::types::{decode_documents, promote_timestamps, to_fields};

pub const ADMINS_COLLECTION: &str = "admins";

pub struct AdminRepository {
    client: FirestoreClient,
}

impl AdminRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, uid: &str) -> FirestoreResult<Option<AdminProfile>> {
        match self.client.get_document(ADMINS_COLLECTION, uid).await? {
            Some(doc) => Ok(Some(doc.decode(Some("id"))?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, uid: &str, admin: &AdminProfile) -> FirestoreResult<()> {
        let mut fields = to_fields(admin)?;
        fields.remove("id");
        promote_timestamps(&mut fields, &["createdAt", "updatedAt"]);
        self.client
            .create_document(ADMINS_COLLECTION, uid, fields)
            .await?;
        Ok(())
    }

    /// Whether `uid` has an admin document with `isActive` set.
    pub async fn is_active_admin(&self, uid: &str) -> FirestoreResult<bool> {
        Ok(self.get(uid).await?.is_some_and(|admin| admin.is_active))
    }

    pub async fn list_all(&self) -> FirestoreResult<Vec<AdminProfile>> {
        let docs = self.client.list_all_documents(ADMINS_COLLECTION).await?;
        decode_documents(&docs, Some("id"))
    }
}
