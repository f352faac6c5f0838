//! Session Store
//!
//! Owns the single bearer token of the signed-in user.
//!
//! ## Lifecycle
//!
//! - set on successful login
//! - cleared on logout
//! - invalidated when an authenticated request reports the session unusable
//!
//! The token is persisted through a [`TokenStore`] so it survives restarts.
//! [`FileTokenStore`] keeps it in a small key-value TOML file under the fixed
//! key [`TOKEN_KEY`]. Invalidation is broadcast on a `watch` channel so views
//! can route back to the login screen.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::watch;

/// Key under which the token is stored
pub const TOKEN_KEY: &str = "token";

/// Name of the key-value storage file inside the data directory
pub const STORAGE_FILE: &str = "storage.toml";

/// Owner read/write only
#[cfg(unix)]
const TOKEN_FILE_MODE: u32 = 0o600;

/// Observable session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No token stored
    Anonymous,
    /// A token is stored
    Authenticated,
    /// The token was dropped after a failed authenticated request
    Invalidated { reason: String },
}

/// Persistence backend for the session token
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the stored token, if any
    async fn load(&self) -> Result<Option<String>, SessionError>;

    /// Persist a token, replacing any previous one
    async fn save(&self, token: &str) -> Result<(), SessionError>;

    /// Remove the stored token. Removing a missing token is not an error.
    async fn remove(&self) -> Result<(), SessionError>;

    /// Human-readable location of the store
    fn location(&self) -> String;
}

/// Token store backed by a key-value TOML file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store inside `data_dir` using the default file name
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(STORAGE_FILE),
        }
    }

    /// Store at an explicit file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>, SessionError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    error: e.to_string(),
                })
            }
        };

        toml::from_str(&content).map_err(|e| SessionError::Parse {
            path: self.path.clone(),
            error: e.to_string(),
        })
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SessionError::Io {
                    path: parent.to_path_buf(),
                    error: e.to_string(),
                })?;
        }

        let content =
            toml::to_string(entries).map_err(|e| SessionError::Serialize(e.to_string()))?;

        let io_error = |e: std::io::Error| SessionError::Io {
            path: self.path.clone(),
            error: e.to_string(),
        };

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(TOKEN_FILE_MODE);

        let mut file = options.open(&self.path).await.map_err(io_error)?;
        // The mode only applies on creation
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(TOKEN_FILE_MODE);
            file.set_permissions(permissions).await.map_err(io_error)?;
        }

        file.write_all(content.as_bytes()).await.map_err(io_error)?;
        file.flush().await.map_err(io_error)
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<String>, SessionError> {
        let mut entries = self.read_entries().await?;
        Ok(entries.remove(TOKEN_KEY).filter(|t| !t.is_empty()))
    }

    async fn save(&self, token: &str) -> Result<(), SessionError> {
        let mut entries = self.read_entries().await?;
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        self.write_entries(&entries).await
    }

    async fn remove(&self) -> Result<(), SessionError> {
        let mut entries = self.read_entries().await?;
        if entries.remove(TOKEN_KEY).is_none() {
            return Ok(());
        }
        self.write_entries(&entries).await
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Volatile token store, used when nothing should touch the disk
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.token.lock().map_err(|_| SessionError::Poisoned)?.clone())
    }

    async fn save(&self, token: &str) -> Result<(), SessionError> {
        *self.token.lock().map_err(|_| SessionError::Poisoned)? = Some(token.to_string());
        Ok(())
    }

    async fn remove(&self) -> Result<(), SessionError> {
        *self.token.lock().map_err(|_| SessionError::Poisoned)? = None;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

/// The session context shared by the API client and the views
pub struct Session {
    store: Box<dyn TokenStore>,
    token: RwLock<Option<String>>,
    state: watch::Sender<SessionState>,
}

impl Session {
    /// Open a session, restoring any token the store already holds
    pub async fn open(store: impl TokenStore + 'static) -> Result<Self, SessionError> {
        let token = store.load().await?;
        let initial = if token.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        };

        tracing::debug!(store = %store.location(), restored = token.is_some(), "Session opened");

        let (state, _) = watch::channel(initial);
        Ok(Self {
            store: Box::new(store),
            token: RwLock::new(token),
            state,
        })
    }

    /// A fresh session that keeps its token in memory only
    pub fn in_memory() -> Self {
        let (state, _) = watch::channel(SessionState::Anonymous);
        Self {
            store: Box::new(MemoryTokenStore::new()),
            token: RwLock::new(None),
            state,
        }
    }

    /// Current bearer token
    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    /// Whether a token is held
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Current observable state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes (login, logout, invalidation)
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Where the token is persisted
    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Store a freshly issued token
    pub async fn set_token(&self, token: impl Into<String>) -> Result<(), SessionError> {
        let token = token.into();
        self.store.save(&token).await?;
        self.replace_token(Some(token))?;
        self.state.send_replace(SessionState::Authenticated);
        tracing::info!("Session token stored");
        Ok(())
    }

    /// Explicit logout
    pub async fn clear(&self) -> Result<(), SessionError> {
        self.replace_token(None)?;
        self.store.remove().await?;
        self.state.send_replace(SessionState::Anonymous);
        tracing::info!("Session cleared");
        Ok(())
    }

    /// Drop the token after an authenticated request failed.
    ///
    /// Idempotent: concurrent failures may all call this.
    pub async fn invalidate(&self, reason: &str) {
        let had_token = match self.replace_token(None) {
            Ok(previous) => previous.is_some(),
            Err(e) => {
                tracing::error!("Failed to drop session token: {}", e);
                false
            }
        };

        if let Err(e) = self.store.remove().await {
            tracing::error!("Failed to remove stored token: {}", e);
        }

        if had_token {
            tracing::warn!(reason = %reason, "Session invalidated");
            self.state.send_replace(SessionState::Invalidated {
                reason: reason.to_string(),
            });
        }
    }

    fn replace_token(&self, token: Option<String>) -> Result<Option<String>, SessionError> {
        let mut guard = self.token.write().map_err(|_| SessionError::Poisoned)?;
        Ok(std::mem::replace(&mut *guard, token))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.store.location())
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

/// Session storage errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access session storage {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse session storage {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Failed to serialize session storage: {0}")]
    Serialize(String),

    #[error("Session lock poisoned")]
    Poisoned,
}
