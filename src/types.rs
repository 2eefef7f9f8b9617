use serde::{Deserialize, Serialize};

/// Employee document, keyed by `id` in the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Document key
    pub id: i64,
    /// Omitted from the wire when empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Omitted from the wire when empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,
    /// Omitted from the wire when zero
    #[serde(default, skip_serializing_if = "is_zero")]
    pub salary: f64,
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

impl Employee {
    /// Employee carrying only its identifier
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            name: String::new(),
            address: String::new(),
            salary: 0.0,
        }
    }

    /// Synthetic employee used when seeding the index
    pub fn synthetic(id: i64) -> Self {
        Self {
            id,
            name: format!("person{}", id),
            address: format!("address{}", id),
            salary: id as f64 * 100.0,
        }
    }
}

/// Engine query response, narrowed to the documents it carries
#[derive(Debug, Default, Deserialize)]
pub struct SearchHits {
    #[serde(default)]
    pub hits: HitList,
}

/// Inner `hits` object of a query response
#[derive(Debug, Default, Deserialize)]
pub struct HitList {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// Single hit wrapper
#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_source")]
    pub source: Option<Employee>,
}

impl SearchHits {
    /// Flatten hits into employees, skipping hits without a source document
    pub fn into_employees(self) -> Vec<Employee> {
        self.hits
            .hits
            .into_iter()
            .filter_map(|hit| hit.source)
            .collect()
    }
}

/// Response body for a successful delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedEmployee {
    pub id: i64,
}

/// Health check response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "OK".to_string(),
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
