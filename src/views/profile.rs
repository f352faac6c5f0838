//! Profile Screen
//!
//! Loads every region of the profile concurrently, then hands a finished
//! [`ProfilePage`] to the renderers. A failed region degrades on its own;
//! a rejected session replaces the whole page with a logged-out outcome.

use std::sync::Arc;

use crate::chart::{ChartOptions, ChartRenderer, Element};
use crate::client::models::{AuditResponse, TransactionResponse, UserResponse};
use crate::client::queries::{
    AUDIT_RATIO_QUERY, SKILLS_QUERY, TOTAL_XP_QUERY, USER_INFO_QUERY, XP_PROGRESS_QUERY,
};
use crate::client::{ApiClient, AuditStats, ClientError, Transaction, User};
use crate::format::{format_ratio, format_xp};
use crate::session::SessionState;

/// A loaded region, or the message shown in its place
pub type Region<T> = Result<T, String>;

/// Everything the profile screen shows
#[derive(Debug, Clone)]
pub struct ProfilePage {
    pub user: Region<User>,
    pub total_xp: Region<f64>,
    pub audit: Region<AuditStats>,
    pub xp_chart: Region<Element>,
    pub skills_chart: Region<Element>,
}

/// Result of loading the profile
#[derive(Debug, Clone)]
pub enum ProfileOutcome {
    Ready(Box<ProfilePage>),
    /// The session ended while loading; show the login screen
    LoggedOut { reason: String },
}

/// Profile controller
pub struct ProfileView {
    client: Arc<ApiClient>,
    xp_options: ChartOptions,
    skills_options: ChartOptions,
}

impl ProfileView {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            xp_options: ChartOptions::xp_progress(),
            skills_options: ChartOptions::skills(),
        }
    }

    /// Builder method: chart configuration
    pub fn charts(mut self, xp_options: ChartOptions, skills_options: ChartOptions) -> Self {
        self.xp_options = xp_options;
        self.skills_options = skills_options;
        self
    }

    /// Issue the five profile queries at once and assemble the page.
    ///
    /// Routes to the login screen when the session is invalidated during the
    /// load, as observed on the session's `watch` channel.
    pub async fn load(&self) -> ProfileOutcome {
        let client = &self.client;
        let mut changes = client.session().subscribe();

        let (user, audit, total, progress, skills) = tokio::join!(
            client.query::<UserResponse>(USER_INFO_QUERY),
            client.query::<AuditResponse>(AUDIT_RATIO_QUERY),
            client.query::<TransactionResponse>(TOTAL_XP_QUERY),
            client.query::<TransactionResponse>(XP_PROGRESS_QUERY),
            client.query::<TransactionResponse>(SKILLS_QUERY),
        );

        let invalidated = match changes.has_changed() {
            Ok(true) => match &*changes.borrow_and_update() {
                SessionState::Invalidated { reason } => Some(reason.clone()),
                _ => None,
            },
            _ => None,
        };

        // Without a token nothing was invalidated, so nothing was broadcast
        let reason = invalidated.or_else(|| {
            [
                user.as_ref().err(),
                audit.as_ref().err(),
                total.as_ref().err(),
                progress.as_ref().err(),
                skills.as_ref().err(),
            ]
            .into_iter()
            .flatten()
            .find(|e| e.ends_session())
            .map(ToString::to_string)
        });

        if let Some(reason) = reason {
            tracing::info!(reason = %reason, "Profile requires a new login");
            return ProfileOutcome::LoggedOut { reason };
        }

        let user = region("user", user).and_then(|r| {
            r.user
                .into_iter()
                .next()
                .ok_or_else(|| "No user data".to_string())
        });
        let audit = region("audit", audit).and_then(|r| {
            r.user
                .into_iter()
                .next()
                .ok_or_else(|| "No audit data".to_string())
        });
        let total_xp = region("total_xp", total).map(|r| r.total());

        let xp_chart = region("xp_progress", progress)
            .map(|r| render_chart(&self.xp_options, &r.transaction));
        let skills_chart =
            region("skills", skills).map(|r| render_chart(&self.skills_options, &r.transaction));

        ProfileOutcome::Ready(Box::new(ProfilePage {
            user,
            total_xp,
            audit,
            xp_chart,
            skills_chart,
        }))
    }
}

fn region<T>(name: &str, result: Result<T, ClientError>) -> Region<T> {
    result.map_err(|e| {
        tracing::warn!(region = name, error = %e, "Profile region failed to load");
        e.to_string()
    })
}

fn render_chart(options: &ChartOptions, records: &[Transaction]) -> Element {
    tracing::debug!(chart = %options.title, records = records.len(), "Rendering chart");
    ChartRenderer::new(options.clone()).render(records)
}

impl ProfilePage {
    /// `Welcome, <lastName> <firstName>!`
    pub fn welcome(&self) -> String {
        match &self.user {
            Ok(user) => format!("Welcome, {}!", user.display_name()),
            Err(_) => "Welcome!".to_string(),
        }
    }

    /// Terminal rendition of the text panels
    pub fn render_text(&self) -> String {
        let mut lines = vec![self.welcome(), String::new()];

        match &self.total_xp {
            Ok(total) => lines.push(format!("Total XP      {}", format_xp(*total))),
            Err(e) => lines.push(format!("Total XP      unavailable ({})", e)),
        }

        match &self.audit {
            Ok(audit) => {
                let ratio = audit
                    .audit_ratio
                    .map(format_ratio)
                    .unwrap_or_else(|| "-".to_string());
                lines.push(format!("Audit ratio   {}", ratio));
                lines.push(format!("  Done        {}", format_xp(audit.total_up)));
                lines.push(format!("  Received    {}", format_xp(audit.total_down)));
            }
            Err(e) => lines.push(format!("Audit ratio   unavailable ({})", e)),
        }

        for (title, chart) in [("XP Progress", &self.xp_chart), ("Skills", &self.skills_chart)] {
            if let Err(e) = chart {
                lines.push(format!("{:<14}unavailable ({})", title, e));
            }
        }

        lines.join("\n")
    }

    /// Standalone HTML document with panels and charts
    pub fn render_html(&self) -> String {
        super::page::document(self)
    }
}
