//! Bootstrap
//!
//! Wires config, session and client together and decides which screen runs
//! first: the profile when a token is stored, the login prompt otherwise.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::chart::{ChartRenderer, Element};
use crate::client::models::TransactionResponse;
use crate::client::queries::{SKILLS_QUERY, XP_PROGRESS_QUERY};
use crate::client::{ApiClient, ClientError, Transaction};
use crate::config::Config;
use crate::session::{FileTokenStore, Session, SessionError};
use crate::views::{
    LoginFailure, LoginForm, LoginView, ProfileOutcome, ProfilePage, ProfileView, SecretInput,
    View, INVALID_CREDENTIALS,
};

/// Login prompts before the bootstrap gives up
pub const MAX_LOGIN_ATTEMPTS: usize = 3;

/// The two chartable datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Dataset {
    /// Cumulative XP over time
    Xp,
    /// Best level per skill
    Skills,
}

impl Dataset {
    pub fn query(self) -> &'static str {
        match self {
            Dataset::Xp => XP_PROGRESS_QUERY,
            Dataset::Skills => SKILLS_QUERY,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dataset::Xp => "xp",
            Dataset::Skills => "skills",
        }
    }
}

/// The running dashboard
pub struct App {
    config: Config,
    client: Arc<ApiClient>,
}

impl App {
    /// Open the persisted session and build the client
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let store = FileTokenStore::in_dir(config.session.data_path());
        let session = Session::open(store).await?;
        Self::with_session(config, Arc::new(session))
    }

    /// Build around an existing session
    pub fn with_session(config: Config, session: Arc<Session>) -> Result<Self, AppError> {
        let client = ApiClient::new(config.api.client_config(), session)?;
        Ok(Self {
            config,
            client: Arc::new(client),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn session(&self) -> &Arc<Session> {
        self.client.session()
    }

    /// Screen to start on
    pub fn initial_view(&self) -> View {
        if self.session().is_authenticated() {
            View::Profile
        } else {
            View::Login
        }
    }

    pub async fn login(&self, form: &LoginForm) -> Result<View, LoginFailure> {
        LoginView::new(Arc::clone(&self.client)).submit(form).await
    }

    /// Drop the stored token
    pub async fn logout(&self) -> Result<View, AppError> {
        self.session().clear().await?;
        Ok(View::Login)
    }

    pub async fn show_profile(&self) -> ProfileOutcome {
        ProfileView::new(Arc::clone(&self.client))
            .charts(
                self.config.chart.xp_options(),
                self.config.chart.skills_options(),
            )
            .load()
            .await
    }

    /// Write the dashboard document; returns its path
    pub fn write_dashboard(&self, page: &ProfilePage) -> Result<PathBuf, AppError> {
        let path = self.config.output.dashboard_path();
        write_file(&path, &page.render_html())?;
        tracing::info!(path = %path.display(), "Dashboard written");
        Ok(path)
    }

    /// Fetch the records behind one chart
    pub async fn fetch(&self, dataset: Dataset) -> Result<Vec<Transaction>, ClientError> {
        let response: TransactionResponse = self.client.query(dataset.query()).await?;
        tracing::debug!(
            dataset = dataset.name(),
            records = response.transaction.len(),
            "Fetched dataset"
        );
        Ok(response.transaction)
    }

    /// Draw one chart with the configured options
    pub fn render_chart(&self, dataset: Dataset, records: &[Transaction]) -> Element {
        let options = match dataset {
            Dataset::Xp => self.config.chart.xp_options(),
            Dataset::Skills => self.config.chart.skills_options(),
        };
        ChartRenderer::new(options).render(records)
    }

    /// Run the screens until a dashboard is written.
    ///
    /// Prompts on `output` and reads credentials from `input` whenever the
    /// login screen is shown, including after the session ends mid-load.
    /// `secrets` decides how the password is read.
    pub async fn bootstrap<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
        secrets: SecretInput,
    ) -> Result<PathBuf, AppError> {
        let mut view = self.initial_view();
        let mut attempts = 0;

        loop {
            match view {
                View::Login => {
                    if attempts == MAX_LOGIN_ATTEMPTS {
                        return Err(AppError::LoginFailed);
                    }
                    attempts += 1;

                    let form = LoginForm::prompt(input, output, None, secrets)?;
                    match self.login(&form).await {
                        Ok(next) => view = next,
                        Err(failure) => writeln!(output, "{}", failure)?,
                    }
                }
                View::Profile => match self.show_profile().await {
                    ProfileOutcome::Ready(page) => {
                        writeln!(output, "{}", page.render_text())?;
                        let path = self.write_dashboard(&page)?;
                        writeln!(output, "\nDashboard written to {}", path.display())?;
                        return Ok(path);
                    }
                    ProfileOutcome::LoggedOut { reason } => {
                        writeln!(output, "Session ended ({}). Please log in again.", reason)?;
                        view = View::Login;
                    }
                },
            }
        }
    }
}

/// Write `content` to `path`, creating parent directories
pub fn write_file(path: &std::path::Path, content: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| AppError::Io {
            path: parent.to_path_buf(),
            error: e.to_string(),
        })?;
    }
    std::fs::write(path, content).map_err(|e| AppError::Io {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Errors surfaced by the dashboard
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Failed to write {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("{} Giving up after {} attempts", INVALID_CREDENTIALS, MAX_LOGIN_ATTEMPTS)]
    LoginFailed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{TokenStore, STORAGE_FILE};
    use crate::testing::{MockPlatform, ISSUED_TOKEN, VALID_IDENTIFIER, VALID_SECRET};
    use std::io::Cursor;
    use tempfile::{tempdir, TempDir};

    fn config_for(mock: &MockPlatform, dir: &TempDir) -> Config {
        let api = mock.api_config();
        let mut config = Config::default();
        config.api.signin_url = api.signin_url;
        config.api.graphql_url = api.graphql_url;
        config.api.request_timeout_secs = Some(5);
        config.session.data_dir = dir.path().join("data").to_string_lossy().to_string();
        config.output.dir = dir.path().join("out").to_string_lossy().to_string();
        config
    }

    #[tokio::test]
    async fn test_expired_session_returns_to_login() {
        let mock = MockPlatform::start().await;
        let dir = tempdir().unwrap();
        let app = App::new(config_for(&mock, &dir)).await.unwrap();
        let storage = dir.path().join("data").join(STORAGE_FILE);

        assert_eq!(app.initial_view(), View::Login);

        let next = app
            .login(&LoginForm::new(VALID_IDENTIFIER, VALID_SECRET))
            .await
            .unwrap();
        assert_eq!(next, View::Profile);
        assert!(std::fs::read_to_string(&storage).unwrap().contains(ISSUED_TOKEN));

        mock.fail_queries_with("Could not verify JWT: JWTExpired");
        let outcome = app.show_profile().await;

        assert!(matches!(outcome, ProfileOutcome::LoggedOut { .. }));
        assert_eq!(app.initial_view(), View::Login);
        assert!(!std::fs::read_to_string(&storage).unwrap().contains(ISSUED_TOKEN));
    }

    #[tokio::test]
    async fn test_stored_token_starts_on_profile() {
        let mock = MockPlatform::start().await;
        let dir = tempdir().unwrap();
        let config = config_for(&mock, &dir);

        FileTokenStore::in_dir(config.session.data_path())
            .save(ISSUED_TOKEN)
            .await
            .unwrap();

        let app = App::new(config).await.unwrap();
        assert_eq!(app.initial_view(), View::Profile);

        assert_eq!(app.logout().await.unwrap(), View::Login);
        assert_eq!(app.initial_view(), View::Login);
    }

    #[tokio::test]
    async fn test_bootstrap_writes_dashboard() {
        let mock = MockPlatform::start().await;
        let dir = tempdir().unwrap();
        let app = App::new(config_for(&mock, &dir)).await.unwrap();

        let mut input = Cursor::new(format!(
            "{}\nwrong\n{}\n{}\n",
            VALID_IDENTIFIER, VALID_IDENTIFIER, VALID_SECRET
        ));
        let mut output = Vec::new();

        let path = app
            .bootstrap(&mut input, &mut output, SecretInput::Line)
            .await
            .unwrap();

        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches(INVALID_CREDENTIALS).count(), 1);
        assert!(shown.contains("Welcome, Doe John!"));

        assert_eq!(path, dir.path().join("out").join("dashboard.html"));
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("chart-line"));
        assert!(html.contains("chart-bar"));
    }

    #[tokio::test]
    async fn test_bootstrap_gives_up() {
        let mock = MockPlatform::start().await;
        let dir = tempdir().unwrap();
        let app = App::new(config_for(&mock, &dir)).await.unwrap();

        let mut input = Cursor::new("");
        let mut output = Vec::new();

        let result = app
            .bootstrap(&mut input, &mut output, SecretInput::Line)
            .await;
        assert!(matches!(result, Err(AppError::LoginFailed)));
        assert_eq!(mock.query_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_and_render() {
        let mock = MockPlatform::start().await;
        let dir = tempdir().unwrap();
        let app = App::new(config_for(&mock, &dir)).await.unwrap();
        app.login(&LoginForm::new(VALID_IDENTIFIER, VALID_SECRET))
            .await
            .unwrap();

        let records = app.fetch(Dataset::Xp).await.unwrap();
        assert_eq!(records.len(), 3);

        let svg = app.render_chart(Dataset::Xp, &records);
        assert_eq!(svg.find_by_class("marker").len(), 3);
    }
}
