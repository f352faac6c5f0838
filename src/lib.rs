//! # xpdash
//!
//! Learning-progress dashboard for the Zone01 platform: signs in to the
//! platform's GraphQL API, then renders XP and skill statistics as text
//! panels and two hand-drawn SVG charts.
//!
//! ## Modules
//!
//! - [`format`]: display formatting and credential encoding
//! - [`session`]: the persisted session token
//! - [`client`]: signin and GraphQL queries
//! - [`chart`]: line and bar charts as SVG
//! - [`views`]: login and profile screens
//! - [`app`]: bootstrap and output files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use xpdash::{App, Config, LoginForm, ProfileOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = App::new(Config::load_default()).await?;
//!
//!     app.login(&LoginForm::new("student", "password")).await?;
//!
//!     if let ProfileOutcome::Ready(page) = app.show_profile().await {
//!         println!("{}", page.render_text());
//!         app.write_dashboard(&page)?;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod chart;
pub mod client;
pub mod config;
pub mod export;
pub mod format;
pub mod session;
pub mod views;

#[cfg(test)]
mod testing;

// Re-export top-level types for convenience
pub use app::{App, AppError, Dataset};

pub use chart::{Aggregation, ChartOptions, ChartRenderer, LinearScale, ScaleKind};

pub use client::{ApiClient, ApiClientConfig, AuditStats, ClientError, Transaction, User};

pub use config::{Config, ConfigError, LoggingConfig};

pub use format::{decode_credentials, encode_credentials, format_xp, FormatError};

pub use session::{
    FileTokenStore, MemoryTokenStore, Session, SessionError, SessionState, TokenStore,
};

pub use views::{LoginFailure, LoginForm, ProfileOutcome, ProfilePage, SecretInput, View};
