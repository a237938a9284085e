//! Field-level document updates.
//!
//! A [`FieldPatch`] collects the fields to write together with the update
//! mask that limits the write to exactly those fields.

use std::collections::HashMap;

use chrono::Utc;

use crate::client::FirestoreClient;
use crate::error::FirestoreResult;
use crate::types::{json_to_value, Document, MapValue, ToFirestoreValue, Value};

#[derive(Debug, Clone, Default)]
pub struct FieldPatch {
    fields: HashMap<String, Value>,
    mask: Vec<String>,
}

impl FieldPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one top-level field.
    pub fn set(mut self, name: &str, value: Value) -> Self {
        if !self.fields.contains_key(name) {
            self.mask.push(name.to_string());
        }
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn set_json(self, name: &str, value: &serde_json::Value) -> Self {
        self.set(name, json_to_value(value))
    }

    /// Write every entry of a JSON object. Entries listed in
    /// `timestamp_fields` that hold RFC 3339 strings are stored as
    /// timestamps.
    pub fn merge(
        mut self,
        map: &serde_json::Map<String, serde_json::Value>,
        timestamp_fields: &[&str],
    ) -> Self {
        for (name, value) in map {
            let value = match value {
                serde_json::Value::String(s)
                    if timestamp_fields.contains(&name.as_str())
                        && chrono::DateTime::parse_from_rfc3339(s).is_ok() =>
                {
                    Value::TimestampValue(s.clone())
                }
                other => json_to_value(other),
            };
            self = self.set(name, value);
        }
        self
    }

    /// Write one key of a map field without touching its siblings.
    pub fn set_entry(mut self, parent: &str, key: &str, value: Value) -> Self {
        let entry = self
            .fields
            .entry(parent.to_string())
            .or_insert_with(|| Value::MapValue(MapValue { fields: Some(HashMap::new()) }));
        if let Value::MapValue(map) = entry {
            map.fields
                .get_or_insert_with(HashMap::new)
                .insert(key.to_string(), value);
        }
        self.mask.push(format!("{}.{}", parent, key));
        self
    }

    /// Stamp `name` with the current time.
    pub fn touch(self, name: &str) -> Self {
        self.set(name, Utc::now().to_firestore_value())
    }

    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    pub fn field_paths(&self) -> &[String] {
        &self.mask
    }

    /// Apply to an existing document. Fails with `NotFound` when the
    /// document does not exist.
    pub async fn apply(
        self,
        client: &FirestoreClient,
        collection: &str,
        doc_id: &str,
    ) -> FirestoreResult<Document> {
        client
            .update_document(collection, doc_id, self.fields, Some(self.mask))
            .await
    }
}
