//! In-process stand-in for the search engine REST API, used by tests.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::EngineConfig;

#[derive(Default)]
struct FakeState {
    indices: HashSet<String>,
    docs: BTreeMap<i64, Value>,
    fail_ids: HashSet<i64>,
    health_delay: Option<Duration>,
}

type Shared = Arc<Mutex<FakeState>>;
type Reply = (StatusCode, Json<Value>);

/// Fake engine listening on an ephemeral local port
pub(crate) struct FakeEngine {
    pub base_url: String,
    state: Shared,
    handle: JoinHandle<()>,
}

impl FakeEngine {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState::default()));

        let app = Router::new()
            .route("/", get(root))
            .route("/:index", put(create_index))
            .route("/:index/_doc/:id", put(put_doc).delete(delete_doc))
            .route("/:index/_update/:id", axum::routing::post(update_doc))
            .route("/:index/_search", get(search).post(search))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            handle,
        }
    }

    /// Client configuration pointing at this engine
    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            base_url: self.base_url.clone(),
            index: "employee".to_string(),
            request_timeout_ms: 2_000,
            connect_timeout_ms: 1_000,
        }
    }

    /// Make document writes for `id` fail with a 500
    pub fn fail_writes_for(&self, id: i64) {
        self.state.lock().unwrap().fail_ids.insert(id);
    }

    /// Delay the root endpoint
    pub fn delay_health(&self, delay: Duration) {
        self.state.lock().unwrap().health_delay = Some(delay);
    }

    pub fn index_exists(&self, index: &str) -> bool {
        self.state.lock().unwrap().indices.contains(index)
    }

    pub fn document(&self, id: i64) -> Option<Value> {
        self.state.lock().unwrap().docs.get(&id).cloned()
    }

    pub fn document_ids(&self) -> Vec<i64> {
        self.state.lock().unwrap().docs.keys().copied().collect()
    }
}

impl Drop for FakeEngine {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn error_reply(status: StatusCode, kind: &str, reason: String) -> Reply {
    (
        status,
        Json(json!({
            "error": { "root_cause": [], "type": kind, "reason": reason },
            "status": status.as_u16()
        })),
    )
}

async fn root(State(state): State<Shared>) -> Reply {
    let delay = state.lock().unwrap().health_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    (
        StatusCode::OK,
        Json(json!({ "name": "fake-node", "cluster_name": "fake", "tagline": "You Know, for Search" })),
    )
}

async fn create_index(State(state): State<Shared>, Path(index): Path<String>, Json(_mapping): Json<Value>) -> Reply {
    let mut state = state.lock().unwrap();
    if !state.indices.insert(index.clone()) {
        return error_reply(
            StatusCode::BAD_REQUEST,
            "resource_already_exists_exception",
            format!("index [{}] already exists", index),
        );
    }
    (StatusCode::OK, Json(json!({ "acknowledged": true, "index": index })))
}

async fn put_doc(State(state): State<Shared>, Path((index, id)): Path<(String, i64)>, Json(doc): Json<Value>) -> Reply {
    let mut state = state.lock().unwrap();
    if state.fail_ids.contains(&id) {
        return error_reply(StatusCode::INTERNAL_SERVER_ERROR, "engine_exception", format!("write rejected for [{}]", id));
    }
    state.indices.insert(index.clone());
    let created = state.docs.insert(id, doc).is_none();
    let (status, result) = if created {
        (StatusCode::CREATED, "created")
    } else {
        (StatusCode::OK, "updated")
    };
    (status, Json(json!({ "_index": index, "_id": id.to_string(), "result": result })))
}

async fn update_doc(State(state): State<Shared>, Path((index, id)): Path<(String, i64)>, Json(body): Json<Value>) -> Reply {
    let mut state = state.lock().unwrap();
    let Some(Value::Object(patch)) = body.get("doc").cloned() else {
        return error_reply(StatusCode::BAD_REQUEST, "action_request_validation_exception", "script or doc is missing".to_string());
    };
    let Some(Value::Object(stored)) = state.docs.get_mut(&id) else {
        return error_reply(StatusCode::NOT_FOUND, "document_missing_exception", format!("[{}]: document missing", id));
    };
    for (key, value) in patch {
        stored.insert(key, value);
    }
    (StatusCode::OK, Json(json!({ "_index": index, "_id": id.to_string(), "result": "updated" })))
}

async fn delete_doc(State(state): State<Shared>, Path((index, id)): Path<(String, i64)>) -> Reply {
    let mut state = state.lock().unwrap();
    if !state.indices.contains(&index) {
        return error_reply(StatusCode::NOT_FOUND, "index_not_found_exception", format!("no such index [{}]", index));
    }
    match state.docs.remove(&id) {
        Some(_) => (StatusCode::OK, Json(json!({ "_id": id.to_string(), "result": "deleted" }))),
        None => (StatusCode::NOT_FOUND, Json(json!({ "_id": id.to_string(), "result": "not_found" }))),
    }
}

async fn search(State(state): State<Shared>, Path(index): Path<String>, Json(body): Json<Value>) -> Reply {
    let state = state.lock().unwrap();
    if !state.indices.contains(&index) {
        return error_reply(StatusCode::NOT_FOUND, "index_not_found_exception", format!("no such index [{}]", index));
    }
    let Some(keyword) = body.pointer("/query/match/name").and_then(Value::as_str) else {
        return error_reply(StatusCode::BAD_REQUEST, "parsing_exception", "unknown query".to_string());
    };

    let terms: HashSet<String> = keyword.split_whitespace().map(str::to_lowercase).collect();
    let hits: Vec<Value> = state
        .docs
        .iter()
        .filter(|(_, doc)| {
            doc.get("name")
                .and_then(Value::as_str)
                .map(|name| name.split_whitespace().any(|token| terms.contains(&token.to_lowercase())))
                .unwrap_or(false)
        })
        .map(|(id, doc)| json!({ "_index": index, "_id": id.to_string(), "_score": 1.0, "_source": doc }))
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "took": 1,
            "timed_out": false,
            "hits": { "total": { "value": hits.len(), "relation": "eq" }, "hits": hits }
        })),
    )
}
