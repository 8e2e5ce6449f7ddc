#![allow(dead_code)]

//! In-process stand-in for the tracking backend.
//!
//! Records are raw JSON objects kept per collection; every request is logged
//! so tests can assert on what the client actually sent.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde_json::{Value, json};
use tokio::sync::watch;
use tracker::{AuthSession, Notifier, TrackerContext};

#[derive(Debug, Clone)]
pub struct Logged {
    pub method: &'static str,
    pub collection: String,
    pub id: Option<String>,
    pub body: Option<Value>,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct BackendState {
    collections: HashMap<String, Vec<Value>>,
    requests: Vec<Logged>,
    fail_reads: bool,
    fail_writes: bool,
}

type Shared = Arc<Mutex<BackendState>>;

pub struct Backend {
    pub base_url: String,
    state: Shared,
}

impl Backend {
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state: Shared = Arc::default();
        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base_url: format!("http://{addr}/api"),
            state,
        }
    }

    pub fn context(&self, auth: &AuthSession) -> TrackerContext {
        TrackerContext::new(&self.base_url, auth.clone(), Notifier::new()).unwrap()
    }

    pub fn seed(&self, collection: &str, record: Value) {
        lock(&self.state)
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }

    pub fn stored(&self, collection: &str) -> Vec<Value> {
        lock(&self.state)
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn requests(&self, method: &str, collection: &str) -> Vec<Logged> {
        lock(&self.state)
            .requests
            .iter()
            .filter(|req| req.method == method && req.collection == collection)
            .cloned()
            .collect()
    }

    pub fn count(&self, method: &str, collection: &str) -> usize {
        self.requests(method, collection).len()
    }

    pub fn total_requests(&self) -> usize {
        lock(&self.state).requests.len()
    }

    pub fn fail_reads(&self, fail: bool) {
        lock(&self.state).fail_reads = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        lock(&self.state).fail_writes = fail;
    }
}

/// Waits (bounded) until the watched value satisfies `predicate`.
pub async fn wait_for<T: Clone>(rx: &mut watch::Receiver<T>, predicate: impl FnMut(&T) -> bool) -> T {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for cache update")
        .expect("cache channel closed")
        .clone()
}

pub fn toast_message(notifier: &Notifier) -> Option<String> {
    notifier.current().map(|toast| toast.message)
}

/// Asserts that exactly one toast was shown since `shown_before` and that it
/// is the visible one.
pub fn assert_one_toast(notifier: &Notifier, shown_before: u64, message: &str) {
    assert_eq!(notifier.displayed() - shown_before, 1, "toasts shown for {message:?}");
    assert_eq!(toast_message(notifier).as_deref(), Some(message));
}

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap()
}

fn router(state: Shared) -> Router {
    let api = Router::new()
        .route("/{collection}", get(list).post(create))
        .route("/{collection}/{id}", put(update).delete(remove))
        .with_state(state);
    Router::new().nest("/api", api)
}

fn log(
    state: &mut BackendState,
    method: &'static str,
    collection: &str,
    id: Option<&str>,
    body: Option<&Value>,
    headers: &HeaderMap,
) {
    state.requests.push(Logged {
        method,
        collection: collection.to_string(),
        id: id.map(str::to_string),
        body: body.cloned(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    });
}

fn failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "backend unavailable"})),
    )
        .into_response()
}

fn matches(record: &Value, id: &str) -> bool {
    record.get("_id").and_then(Value::as_str) == Some(id)
        || record.get("id").and_then(Value::as_str) == Some(id)
}

async fn list(
    State(state): State<Shared>,
    Path(collection): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = lock(&state);
    log(&mut state, "GET", &collection, None, None, &headers);
    if state.fail_reads {
        return failure();
    }
    let records = state
        .collections
        .get(&collection)
        .cloned()
        .unwrap_or_default();
    Json(records).into_response()
}

async fn create(
    State(state): State<Shared>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    log(&mut state, "POST", &collection, None, Some(&body), &headers);
    if state.fail_writes {
        return failure();
    }

    let mut record = body;
    record["_id"] = json!(uuid::Uuid::new_v4().to_string());
    let records = state.collections.entry(collection.clone()).or_default();
    if collection == "moods" {
        records.retain(|mood| mood.get("date") != record.get("date"));
    }
    records.push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn update(
    State(state): State<Shared>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    log(&mut state, "PUT", &collection, Some(&id), Some(&body), &headers);
    if state.fail_writes {
        return failure();
    }

    let Some(record) = state
        .collections
        .get_mut(&collection)
        .and_then(|records| records.iter_mut().find(|record| matches(record, &id)))
    else {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))).into_response();
    };
    if let (Some(target), Some(patch)) = (record.as_object_mut(), body.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(record.clone()).into_response()
}

async fn remove(
    State(state): State<Shared>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut state = lock(&state);
    log(&mut state, "DELETE", &collection, Some(&id), None, &headers);
    if state.fail_writes {
        return failure();
    }

    let records = state.collections.entry(collection).or_default();
    let before = records.len();
    records.retain(|record| !matches(record, &id));
    if records.len() == before {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))).into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}
