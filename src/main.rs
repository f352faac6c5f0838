//! xpdash CLI
//!
//! Command-line front end for the dashboard:
//! - Sign in and out
//! - Print the profile panels and write the HTML dashboard
//! - Write single charts as SVG
//! - Export chart data as CSV

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use xpdash::app::write_file;
use xpdash::config::generate_default_config;
use xpdash::export::{write_skills_csv, write_xp_csv};
use xpdash::views::INVALID_CREDENTIALS;
use xpdash::{App, Config, Dataset, LoggingConfig, LoginForm, ProfileOutcome, SecretInput};

#[derive(Parser)]
#[command(name = "xpdash")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Learning-progress dashboard for the Zone01 platform")]
#[command(long_about = "xpdash signs in to the Zone01 GraphQL API and renders your XP and skills.\nRun without a subcommand to log in if needed and write the dashboard.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (default: searched in the usual locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for written files
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session token
    Login {
        /// Username or email (prompted when missing)
        #[arg(short, long)]
        identifier: Option<String>,
    },

    /// Forget the stored session token
    Logout,

    /// Show whether a session token is stored
    Status,

    /// Print the profile panels and write the HTML dashboard
    Profile,

    /// Write one chart as a standalone SVG file
    Chart {
        #[arg(value_enum)]
        dataset: Dataset,
        /// Output file (default: <output dir>/<dataset>.svg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export chart data as CSV
    Export {
        #[arg(value_enum)]
        dataset: Dataset,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Config { output }) = &cli.command {
        let config = generate_default_config();
        match output {
            Some(path) => {
                write_file(path, &config)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", config),
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(dir) = &cli.output_dir {
        config.output.dir = dir.to_string_lossy().to_string();
    }

    init_tracing(&config.logging);
    tracing::debug!("xpdash v{}", env!("CARGO_PKG_VERSION"));

    let app = App::new(config).await.context("Failed to open session")?;

    match cli.command {
        None => {
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            app.bootstrap(&mut stdin.lock(), &mut stdout, SecretInput::detect())
                .await?;
        }

        Some(Commands::Login { identifier }) => {
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            let form = LoginForm::prompt(
                &mut stdin.lock(),
                &mut stdout,
                identifier,
                SecretInput::detect(),
            )?;

            if app.login(&form).await.is_err() {
                bail!(INVALID_CREDENTIALS);
            }
            println!("Logged in. Token stored in {}", app.session().location());
        }

        Some(Commands::Logout) => {
            app.logout().await?;
            println!("Logged out.");
        }

        Some(Commands::Status) => {
            println!("xpdash v{}", env!("CARGO_PKG_VERSION"));
            println!();
            if app.session().is_authenticated() {
                println!("Session: logged in");
            } else {
                println!("Session: not logged in");
            }
            println!("Token storage: {}", app.session().location());
            println!("API: {}", app.config().api.graphql_url);
        }

        Some(Commands::Profile) => {
            require_login(&app)?;

            match app.show_profile().await {
                ProfileOutcome::Ready(page) => {
                    println!("{}", page.render_text());
                    let path = app.write_dashboard(&page)?;
                    println!();
                    println!("Dashboard written to {}", path.display());
                }
                ProfileOutcome::LoggedOut { reason } => {
                    bail!("Session ended ({}). Run `xpdash login` again.", reason);
                }
            }
        }

        Some(Commands::Chart { dataset, output }) => {
            require_login(&app)?;

            let records = fetch(&app, dataset).await?;
            let svg = app.render_chart(dataset, &records).render();

            let path = output.unwrap_or_else(|| {
                app.config()
                    .output
                    .file_path(&format!("{}.svg", dataset.name()))
            });
            write_file(&path, &svg)?;
            println!("Chart written to {}", path.display());
        }

        Some(Commands::Export { dataset, output }) => {
            require_login(&app)?;

            let records = fetch(&app, dataset).await?;
            let mut buffer = Vec::new();
            let rows = match dataset {
                Dataset::Xp => write_xp_csv(&mut buffer, &records)?,
                Dataset::Skills => write_skills_csv(&mut buffer, &records)?,
            };

            match output {
                Some(path) => {
                    let content = String::from_utf8(buffer).context("CSV output is not UTF-8")?;
                    write_file(&path, &content)?;
                    println!("Exported {} rows to {:?}", rows, path);
                }
                None => std::io::stdout().write_all(&buffer)?,
            }
        }

        // Handled before the config is loaded
        Some(Commands::Config { .. }) => {}
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("xpdash={}", logging.level)));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn require_login(app: &App) -> anyhow::Result<()> {
    if !app.session().is_authenticated() {
        bail!("Not logged in. Run `xpdash login` first.");
    }
    Ok(())
}

async fn fetch(app: &App, dataset: Dataset) -> anyhow::Result<Vec<xpdash::Transaction>> {
    match app.fetch(dataset).await {
        Ok(records) => Ok(records),
        Err(e) if e.ends_session() => {
            bail!("Session ended ({}). Run `xpdash login` again.", e)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to fetch {} data", dataset.name())),
    }
}
