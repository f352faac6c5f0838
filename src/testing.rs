//! In-process stand-in for the platform API, used by the unit tests.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::client::ApiClientConfig;
use crate::format::encode_credentials;

pub const VALID_IDENTIFIER: &str = "student";
pub const VALID_SECRET: &str = "s3cret";
pub const ISSUED_TOKEN: &str = "header.payload.signature";

#[derive(Default)]
struct MockState {
    query_error: Mutex<Option<String>>,
    status: Mutex<Option<u16>>,
    queries: AtomicUsize,
}

pub struct MockPlatform {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockPlatform {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let router = Router::new()
            .route("/api/auth/signin", post(signin))
            .route("/api/graphql-engine/v1/graphql", post(graphql))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn api_config(&self) -> ApiClientConfig {
        ApiClientConfig {
            signin_url: format!("http://{}/api/auth/signin", self.addr),
            graphql_url: format!("http://{}/api/graphql-engine/v1/graphql", self.addr),
            request_timeout_ms: Some(5_000),
            ..Default::default()
        }
    }

    /// Answer every following query with a GraphQL error payload
    pub fn fail_queries_with(&self, message: &str) {
        *self.state.query_error.lock().unwrap() = Some(message.to_string());
    }

    /// Answer every following query with a bare HTTP status
    pub fn respond_with_status(&self, status: u16) {
        *self.state.status.lock().unwrap() = Some(status);
    }

    pub fn query_count(&self) -> usize {
        self.state.queries.load(Ordering::SeqCst)
    }
}

async fn signin(headers: HeaderMap) -> Response {
    let expected = format!("Basic {}", encode_credentials(VALID_IDENTIFIER, VALID_SECRET));
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false);

    if authorized {
        Json(json!(ISSUED_TOKEN)).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "User does not exist or password incorrect"})),
        )
            .into_response()
    }
}

async fn graphql(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.queries.fetch_add(1, Ordering::SeqCst);

    let bearer = format!("Bearer {}", ISSUED_TOKEN);
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(bearer.as_str()) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    if let Some(status) = *state.status.lock().unwrap() {
        return StatusCode::from_u16(status).unwrap().into_response();
    }

    if let Some(message) = state.query_error.lock().unwrap().clone() {
        return Json(json!({"errors": [{"message": message}]})).into_response();
    }

    let query = body["query"].as_str().unwrap_or_default();
    Json(json!({ "data": fixture_for(query) })).into_response()
}

fn fixture_for(query: &str) -> Value {
    if query.contains("auditRatio") {
        json!({"user": [{"auditRatio": 1.333, "totalUp": 2_000_000, "totalDown": 1_500_000}]})
    } else if query.contains("skill_") {
        json!({"transaction": [
            {"type": "skill_go", "amount": 30},
            {"type": "skill_js", "amount": 40},
            {"type": "skill_go", "amount": 55},
            {"type": "skill_algo", "amount": 55}
        ]})
    } else if query.contains("createdAt") {
        json!({"transaction": [
            {"amount": 1000, "createdAt": "2024-01-10T09:00:00+00:00", "object": {"name": "go-reloaded", "type": "project"}},
            {"amount": 500, "createdAt": "2024-02-10T09:00:00+00:00", "object": {"name": "ascii-art", "type": "project"}},
            {"amount": 250, "createdAt": "2024-03-10T09:00:00+00:00", "object": {"name": "checkpoint", "type": "exercise"}}
        ]})
    } else if query.contains("transaction") {
        json!({"transaction": [
            {"amount": 1000, "object": {"name": "go-reloaded", "type": "project"}},
            {"amount": 500, "object": {"name": "ascii-art", "type": "project"}},
            {"amount": 250, "object": {"name": "checkpoint", "type": "exercise"}}
        ]})
    } else {
        json!({"user": [{"login": "jdoe", "firstName": "John", "lastName": "Doe"}]})
    }
}
