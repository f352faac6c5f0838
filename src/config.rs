//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::chart::ChartOptions;
use crate::client::{ApiClientConfig, DEFAULT_GRAPHQL_URL, DEFAULT_SIGNIN_URL};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub chart: ChartConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Platform endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_signin_url")]
    pub signin_url: String,

    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,

    /// Unset means requests never time out
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_signin_url() -> String {
    DEFAULT_SIGNIN_URL.to_string()
}

fn default_graphql_url() -> String {
    DEFAULT_GRAPHQL_URL.to_string()
}

fn default_user_agent() -> String {
    format!("xpdash/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            signin_url: default_signin_url(),
            graphql_url: default_graphql_url(),
            request_timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    /// Client settings derived from this section
    pub fn client_config(&self) -> ApiClientConfig {
        ApiClientConfig {
            signin_url: self.signin_url.clone(),
            graphql_url: self.graphql_url.clone(),
            request_timeout_ms: self.request_timeout_secs.map(|s| s * 1000),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Where the session token is kept
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("xpdash").to_string_lossy().to_string())
        .unwrap_or_else(|| "./xpdash_data".to_string())
}

impl SessionConfig {
    /// Data directory with a leading `~/` expanded
    pub fn data_path(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Where rendered files go
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,

    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_file_name() -> String {
    "dashboard.html".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            file_name: default_file_name(),
        }
    }
}

impl OutputConfig {
    /// Full path of the dashboard document
    pub fn dashboard_path(&self) -> PathBuf {
        self.file_path(&self.file_name)
    }

    /// Path of a file inside the output directory
    pub fn file_path(&self, name: &str) -> PathBuf {
        expand_home(&self.dir).join(name)
    }
}

fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Chart dimensions in SVG user units
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_width")]
    pub width: f64,

    #[serde(default = "default_line_height")]
    pub line_height: f64,

    #[serde(default = "default_bar_height")]
    pub bar_height: f64,
}

fn default_chart_width() -> f64 {
    800.0
}

fn default_line_height() -> f64 {
    600.0
}

fn default_bar_height() -> f64 {
    400.0
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            line_height: default_line_height(),
            bar_height: default_bar_height(),
        }
    }
}

impl ChartConfig {
    /// Options for the XP progress chart
    pub fn xp_options(&self) -> ChartOptions {
        ChartOptions::xp_progress().with_size(self.width, self.line_height)
    }

    /// Options for the skills chart
    pub fn skills_options(&self) -> ChartOptions {
        ChartOptions::skills().with_size(self.width, self.bar_height)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("xpdash").join("config.toml")),
            Some(PathBuf::from("./xpdash.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(url) = lookup("XPDASH_SIGNIN_URL") {
            self.api.signin_url = url;
        }
        if let Some(url) = lookup("XPDASH_GRAPHQL_URL") {
            self.api.graphql_url = url;
        }

        // Storage overrides
        if let Some(data_dir) = lookup("XPDASH_DATA_DIR") {
            self.session.data_dir = data_dir;
        }
        if let Some(dir) = lookup("XPDASH_OUTPUT_DIR") {
            self.output.dir = dir;
        }

        // Logging overrides
        if let Some(level) = lookup("XPDASH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("XPDASH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    format!(
        r#"# xpdash Configuration
#
# Environment variables override these settings:
# - XPDASH_SIGNIN_URL
# - XPDASH_GRAPHQL_URL
# - XPDASH_DATA_DIR
# - XPDASH_OUTPUT_DIR
# - XPDASH_LOG_LEVEL
# - XPDASH_LOG_FORMAT

[api]
# Credential exchange endpoint
signin_url = "{signin}"

# GraphQL endpoint
graphql_url = "{graphql}"

# Request timeout in seconds (unset: wait indefinitely)
# request_timeout_secs = 30

[session]
# Directory holding storage.toml with the session token
data_dir = "~/.local/share/xpdash"

[output]
# Directory the dashboard is written to
dir = "."

# Dashboard file name
file_name = "dashboard.html"

[chart]
# Chart width (SVG units)
width = 800

# XP progress chart height
line_height = 600

# Skills chart height
bar_height = 400

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#,
        signin = DEFAULT_SIGNIN_URL,
        graphql = DEFAULT_GRAPHQL_URL,
    )
}
