//! Error audit entries in the `logs` collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::FirestoreClient;
use crate::error::FirestoreResult;
use crate::types::{promote_timestamps, to_fields};

pub const LOGS_COLLECTION: &str = "logs";

/// One failed request, as persisted for later review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Free-form request details: method, path, status, request id.
    pub context: serde_json::Value,
}

impl ErrorLogEntry {
    pub fn new(message: impl Into<String>, context: serde_json::Value) -> Self {
        Self {
            message: message.into(),
            timestamp: Utc::now(),
            context,
        }
    }
}

pub struct ErrorLogRepository {
    client: FirestoreClient,
}

impl ErrorLogRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    pub async fn append(&self, entry: &ErrorLogEntry) -> FirestoreResult<()> {
        let mut fields = to_fields(entry)?;
        promote_timestamps(&mut fields, &["timestamp"]);
        self.client.add_document(LOGS_COLLECTION, fields).await?;
        Ok(())
    }
}
