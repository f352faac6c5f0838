//! View Controllers
//!
//! The dashboard has two screens:
//!
//! - **login**: collects credentials and exchanges them for a session token
//! - **profile**: fetches the statistics and lays out panels and charts
//!
//! `page` turns a loaded profile into a standalone HTML document.

pub mod login;
pub mod page;
pub mod profile;

pub use login::{LoginFailure, LoginForm, LoginView, SecretInput, INVALID_CREDENTIALS};
pub use profile::{ProfileOutcome, ProfilePage, ProfileView, Region};

/// The screen to show next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Profile,
}
