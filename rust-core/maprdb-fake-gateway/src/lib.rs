// SPDX-License-Identifier: PMPL-1.0-or-later
//! In-process fake of the MapR-DB REST gateway, shared by the client and
//! demo test suites.
//!
//! Implements just enough of `/auth/v2/token` and `/api/v2/table/...` for
//! the client: Basic-to-bearer token exchange, table create/drop,
//! insert-or-replace, point reads, `$set` updates, deletes and `$eq` / `$ge`
//! conditions. Every request is recorded with its path, headers and JSON
//! body so tests can assert on exactly what went over the wire.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    body::{self, Body},
    extract::{Path, Query, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const USERNAME: &str = "mapr";
pub const PASSWORD: &str = "mapr";
/// `base64("mapr:mapr")`
const VALID_BASIC: &str = "Basic bWFwcjptYXBy";
pub const TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.test-token.signature";
pub const TABLE: &str = "/apps/employee";

/// One request as seen by the gateway, before routing.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Raw (still percent-encoded) path.
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    /// Request body, if it parsed as JSON.
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// `"METHOD path"`, handy for comparing whole request sequences.
    pub fn line(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

#[derive(Default)]
pub struct GatewayState {
    /// Table path -> documents in insertion order.
    tables: HashMap<String, Vec<Value>>,
    requests: Vec<RecordedRequest>,
    /// Answer the token exchange with `{"token": ""}`.
    pub issue_empty_token: bool,
    /// Whether the last table POST carried a JSON array.
    pub last_insert_was_array: Option<bool>,
}

pub type Shared = Arc<Mutex<GatewayState>>;

pub struct FakeGateway {
    pub base_url: String,
    pub state: Shared,
}

impl FakeGateway {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn documents(&self, table: &str) -> Option<Vec<Value>> {
        self.state.lock().unwrap().tables.get(table).cloned()
    }

    pub fn last_insert_was_array(&self) -> Option<bool> {
        self.state.lock().unwrap().last_insert_was_array
    }
}

/// Start the fake gateway on an ephemeral local port.
pub async fn spawn_gateway() -> FakeGateway {
    let state = Shared::default();
    let app = router(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeGateway {
        base_url: format!("http://{addr}"),
        state,
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/auth/v2/token", post(token_handler))
        .route(
            "/api/v2/table/{table}",
            get(query_handler)
                .put(create_table_handler)
                .delete(drop_table_handler)
                .post(insert_handler),
        )
        .route(
            "/api/v2/table/{table}/document/{id}",
            get(get_document_handler)
                .post(update_document_handler)
                .delete(delete_document_handler),
        )
        .layer(middleware::from_fn_with_state(state.clone(), record_request))
        .with_state(state)
}

async fn record_request(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let (parts, payload) = request.into_parts();
    let bytes = body::to_bytes(payload, usize::MAX).await.unwrap_or_default();

    let recorded = RecordedRequest {
        method: parts.method.clone(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        authorization: parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&bytes).ok(),
    };
    state.lock().unwrap().requests.push(recorded);

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

type HandlerResult = Result<Response, (StatusCode, Json<Value>)>;

fn failure(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": message })))
}

fn require_bearer(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let expected = format!("Bearer {TOKEN}");
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(failure(StatusCode::UNAUTHORIZED, "Invalid or missing token")),
    }
}

async fn token_handler(State(state): State<Shared>, headers: HeaderMap) -> HandlerResult {
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(VALID_BASIC) => {
            let token = if state.lock().unwrap().issue_empty_token {
                ""
            } else {
                TOKEN
            };
            Ok(Json(json!({ "token": token })).into_response())
        }
        _ => Err(failure(StatusCode::UNAUTHORIZED, "Invalid credentials")),
    }
}

async fn create_table_handler(
    State(state): State<Shared>,
    Path(table): Path<String>,
    headers: HeaderMap,
) -> HandlerResult {
    require_bearer(&headers)?;
    let mut state = state.lock().unwrap();
    if state.tables.contains_key(&table) {
        return Err(failure(StatusCode::CONFLICT, "Table already exists"));
    }
    state.tables.insert(table, Vec::new());
    Ok(StatusCode::CREATED.into_response())
}

async fn drop_table_handler(
    State(state): State<Shared>,
    Path(table): Path<String>,
    headers: HeaderMap,
) -> HandlerResult {
    require_bearer(&headers)?;
    match state.lock().unwrap().tables.remove(&table) {
        Some(_) => Ok(StatusCode::OK.into_response()),
        None => Err(failure(StatusCode::NOT_FOUND, "Table does not exist")),
    }
}

async fn insert_handler(
    State(state): State<Shared>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> HandlerResult {
    require_bearer(&headers)?;
    let mut state = state.lock().unwrap();
    state.last_insert_was_array = Some(body.is_array());

    let documents = match body {
        Value::Array(items) => items,
        single @ Value::Object(_) => vec![single],
        _ => return Err(failure(StatusCode::BAD_REQUEST, "Expected a JSON document")),
    };
    let rows = state
        .tables
        .get_mut(&table)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Table does not exist"))?;

    for document in documents {
        let Some(id) = document.get("_id").and_then(Value::as_str).map(str::to_string) else {
            return Err(failure(StatusCode::BAD_REQUEST, "Document has no _id"));
        };
        match rows.iter_mut().find(|row| row["_id"] == id.as_str()) {
            Some(existing) => *existing = document,
            None => rows.push(document),
        }
    }
    Ok(StatusCode::OK.into_response())
}

async fn query_handler(
    State(state): State<Shared>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> HandlerResult {
    require_bearer(&headers)?;
    let condition = match params.get("condition") {
        Some(raw) => Some(
            serde_json::from_str::<Value>(raw)
                .map_err(|_| failure(StatusCode::BAD_REQUEST, "Malformed condition"))?,
        ),
        None => None,
    };

    let state = state.lock().unwrap();
    let rows = state
        .tables
        .get(&table)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Table does not exist"))?;

    let mut matched = Vec::new();
    for row in rows {
        let keep = match &condition {
            Some(condition) => matches_condition(row, condition)
                .map_err(|msg| failure(StatusCode::BAD_REQUEST, &msg))?,
            None => true,
        };
        if keep {
            matched.push(row.clone());
        }
    }
    Ok(Json(json!({ "DocumentStream": matched })).into_response())
}

fn matches_condition(row: &Value, condition: &Value) -> Result<bool, String> {
    let operators = condition
        .as_object()
        .ok_or_else(|| "Condition must be an object".to_string())?;
    for (operator, operand) in operators {
        let fields = operand
            .as_object()
            .ok_or_else(|| format!("Operand of {operator} must be an object"))?;
        for (field, expected) in fields {
            let actual = row.get(field);
            let ok = match operator.as_str() {
                "$eq" => actual == Some(expected),
                "$ge" => match (actual.and_then(Value::as_i64), expected.as_i64()) {
                    (Some(a), Some(e)) => a >= e,
                    _ => false,
                },
                other => return Err(format!("Unsupported operator {other}")),
            };
            if !ok {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

async fn get_document_handler(
    State(state): State<Shared>,
    Path((table, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> HandlerResult {
    require_bearer(&headers)?;
    let state = state.lock().unwrap();
    let rows = state
        .tables
        .get(&table)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Table does not exist"))?;
    let found = rows
        .iter()
        .find(|row| row["_id"] == id.as_str())
        .cloned()
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Document not found"))?;
    Ok(Json(found).into_response())
}

async fn update_document_handler(
    State(state): State<Shared>,
    Path((table, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(mutation): Json<Value>,
) -> HandlerResult {
    require_bearer(&headers)?;
    let set = mutation
        .get("$set")
        .and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "Only $set mutations are supported"))?;

    let mut state = state.lock().unwrap();
    let row = state
        .tables
        .get_mut(&table)
        .and_then(|rows| rows.iter_mut().find(|row| row["_id"] == id.as_str()))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Document not found"))?;
    if let Value::Object(fields) = row {
        for (field, value) in set {
            fields.insert(field, value);
        }
    }
    Ok(StatusCode::OK.into_response())
}

async fn delete_document_handler(
    State(state): State<Shared>,
    Path((table, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> HandlerResult {
    require_bearer(&headers)?;
    let mut state = state.lock().unwrap();
    let rows = state
        .tables
        .get_mut(&table)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Table does not exist"))?;
    rows.retain(|row| row["_id"] != id.as_str());
    Ok(StatusCode::OK.into_response())
}
