//! Platform API Client
//!
//! HTTP client for the two platform endpoints: credential exchange (signin)
//! and GraphQL query execution. The session is injected; the client reads the
//! bearer token from it and invalidates it when the platform rejects the
//! session.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::format::encode_credentials;
use crate::session::{Session, SessionError};

/// Default signin endpoint
pub const DEFAULT_SIGNIN_URL: &str = "https://learn.zone01oujda.ma/api/auth/signin";

/// Default GraphQL endpoint
pub const DEFAULT_GRAPHQL_URL: &str =
    "https://learn.zone01oujda.ma/api/graphql-engine/v1/graphql";

/// Platform API client
pub struct ApiClient {
    client: Client,
    config: ApiClientConfig,
    session: Arc<Session>,
}

/// Configuration for the platform client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Credential exchange endpoint
    pub signin_url: String,
    /// GraphQL endpoint
    pub graphql_url: String,
    /// Request timeout in milliseconds; `None` waits indefinitely
    pub request_timeout_ms: Option<u64>,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            signin_url: DEFAULT_SIGNIN_URL.to_string(),
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
            request_timeout_ms: None,
            user_agent: format!("xpdash/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiClient {
    /// Create a client bound to a session
    pub fn new(config: ApiClientConfig, session: Arc<Session>) -> Result<Self, ClientError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(ms) = config.request_timeout_ms {
            builder = builder.timeout(std::time::Duration::from_millis(ms));
        }
        let client = builder.build().map_err(ClientError::Network)?;

        Ok(Self {
            client,
            config,
            session,
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// The session this client authenticates with
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Exchange credentials for a session token.
    ///
    /// Does not touch the session; see [`ApiClient::login`].
    pub async fn exchange_credentials(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<String, ClientError> {
        let credentials = encode_credentials(identifier, secret);

        let response = self
            .client
            .post(&self.config.signin_url)
            .header("Authorization", format!("Basic {}", credentials))
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(ClientError::Network)?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "Signin rejected");
            return Err(ClientError::InvalidCredentials);
        }

        let body = response.text().await.map_err(ClientError::Network)?;
        let token = parse_token(&body);
        if token.is_empty() {
            return Err(ClientError::InvalidCredentials);
        }

        Ok(token)
    }

    /// Exchange credentials and store the token in the session
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<(), ClientError> {
        let token = self.exchange_credentials(identifier, secret).await?;
        self.session.set_token(token).await?;
        tracing::info!(identifier = %identifier, "Signed in");
        Ok(())
    }

    /// Execute a query document and return its `data` object.
    ///
    /// A query-level error or a 401/403 response invalidates the session.
    pub async fn run_query(&self, query: &str) -> Result<serde_json::Value, ClientError> {
        let token = self.session.token().ok_or(ClientError::NotAuthenticated)?;
        let request_id = Uuid::new_v4();

        tracing::debug!(request_id = %request_id, "Running query");

        let response = self
            .client
            .post(&self.config.graphql_url)
            .bearer_auth(token)
            .json(&GraphQlRequest { query })
            .send()
            .await
            .map_err(ClientError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let error = ClientError::Http(status.as_u16());
            if error.ends_session() {
                self.session.invalidate(&error.to_string()).await;
            }
            tracing::debug!(request_id = %request_id, status = %status, "Query failed");
            return Err(error);
        }

        let body: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        if let Some(first) = body.errors.unwrap_or_default().into_iter().next() {
            let error = ClientError::Query(first.message);
            self.session.invalidate(&error.to_string()).await;
            return Err(error);
        }

        body.data
            .ok_or_else(|| ClientError::Decode("response carried no data".to_string()))
    }

    /// Execute a query and deserialize its `data` object
    pub async fn query<T: DeserializeOwned>(&self, query: &str) -> Result<T, ClientError> {
        let data = self.run_query(query).await?;
        serde_json::from_value(data).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// The signin endpoint answers with a JSON string; tolerate a bare token too
fn parse_token(body: &str) -> String {
    serde_json::from_str::<String>(body)
        .unwrap_or_else(|_| body.trim().to_string())
        .trim()
        .to_string()
}

// ============================================
// Request/Response DTOs
// ============================================

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

// ============================================
// Errors
// ============================================

/// Errors that can occur when talking to the platform
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("HTTP error! status: {0}")]
    Http(u16),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ClientError {
    /// Whether this failure means the user has to sign in again
    pub fn ends_session(&self) -> bool {
        match self {
            ClientError::Query(_) | ClientError::NotAuthenticated => true,
            ClientError::Http(status) => *status == 401 || *status == 403,
            _ => false,
        }
    }
}
