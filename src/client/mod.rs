//! Platform Client
//!
//! Talks to the learning platform's two endpoints.
//!
//! ## Architecture
//!
//! - **ApiClient**: signin (Basic credentials -> token) and GraphQL queries
//!   (Bearer token -> JSON data)
//! - **queries**: the fixed query documents the dashboard sends
//! - **models**: typed payloads of those queries

mod api;
pub mod models;
pub mod queries;

pub use api::{ApiClient, ApiClientConfig, ClientError, DEFAULT_GRAPHQL_URL, DEFAULT_SIGNIN_URL};
pub use models::{AuditStats, Transaction, TransactionObject, User};
