/// Engine wire documents
///
/// Index mapping, query bodies and the engine's error convention.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use crate::types::Employee;

/// Error type the engine reports when creating an index that is already there
pub const INDEX_EXISTS_ERROR: &str = "resource_already_exists_exception";

/// Error type the engine reports when updating a document that does not exist
pub const DOCUMENT_MISSING_ERROR: &str = "document_missing_exception";

/// Employee index schema
pub struct IndexSchema;

impl IndexSchema {
    /// Mapping declared once when the index is created
    pub fn mapping() -> Value {
        json!({
            "mappings": {
                "properties": {
                    "id": { "type": "integer" },
                    "name": { "type": "text" },
                    "address": { "type": "text" },
                    "salary": { "type": "float" }
                }
            }
        })
    }

    /// Full-text match on the `name` field
    pub fn match_name_query(keyword: &str) -> Value {
        json!({
            "query": {
                "match": {
                    "name": keyword
                }
            }
        })
    }
}

/// Partial-document envelope for the update endpoint
#[derive(Debug, Serialize)]
pub struct PartialUpdate<'a> {
    pub doc: &'a Employee,
}

/// Engine error body, `{"error": {...} | "...", "status": n}`
#[derive(Debug, Default, Deserialize)]
pub struct EngineErrorBody {
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub status: Option<Value>,
}

impl EngineErrorBody {
    /// Parse leniently; bodies that are not error documents come back empty
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    /// Numeric status echoed in the body, if the engine sent one
    pub fn status(&self) -> Option<u16> {
        self.status.as_ref()?.as_u64()?.try_into().ok()
    }

    /// Machine-readable error type, when the engine sent a structured error
    pub fn error_type(&self) -> Option<&str> {
        self.error.as_ref()?.get("type")?.as_str()
    }

    /// Human-readable description of the failure
    pub fn reason(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::String(message) => Some(message.clone()),
            error => {
                let reason = error.get("reason").and_then(Value::as_str);
                match (self.error_type(), reason) {
                    (Some(kind), Some(reason)) => Some(format!("{}: {}", kind, reason)),
                    (None, Some(reason)) => Some(reason.to_string()),
                    (Some(kind), None) => Some(kind.to_string()),
                    (None, None) => None,
                }
            }
        }
    }
}
