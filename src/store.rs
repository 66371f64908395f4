//! Durable client-side token storage
//!
//! The token pair and the user-role tag are persisted as string-valued keys
//! (`accessToken`, `refreshToken`, `tipo_usuario`). The store is the sole
//! owner of the token pair; other components only hold copies for the
//! duration of a single operation.
//!
//! An absent access token means the pair is absent for authentication
//! purposes. A lone refresh token is not an authenticated session, it is an
//! invitation to attempt a refresh.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Persisted token state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(rename = "accessToken", default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
    #[serde(rename = "tipo_usuario", default, skip_serializing_if = "Option::is_none")]
    pub tipo_usuario: Option<String>,
}

impl StoredTokens {
    /// Whether any state is held at all
    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none() && self.tipo_usuario.is_none()
    }
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("no user configuration directory available")]
    NoConfigDir,
}

/// Client-side token storage
pub trait TokenStore: Send + Sync {
    /// Read the persisted token state (empty defaults when nothing is stored)
    fn load(&self) -> Result<StoredTokens, StoreError>;

    /// Replace the persisted token state
    fn save(&self, tokens: &StoredTokens) -> Result<(), StoreError>;

    /// Remove all persisted token state
    fn clear(&self) -> Result<(), StoreError>;

    /// The stored access token, if any
    fn access_token(&self) -> Option<String> {
        self.load().ok().and_then(|t| t.access)
    }

    /// The stored refresh token, if any
    fn refresh_token(&self) -> Option<String> {
        self.load().ok().and_then(|t| t.refresh)
    }

    /// The stored role tag, if any
    fn user_role(&self) -> Option<String> {
        self.load().ok().and_then(|t| t.tipo_usuario)
    }

    /// Replace only the access token, keeping the refresh token and role tag
    fn rotate_access(&self, access: &str) -> Result<(), StoreError> {
        let mut tokens = self.load()?;
        tokens.access = Some(access.to_string());
        self.save(&tokens)
    }
}

/// In-memory token store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    tokens: Mutex<StoredTokens>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryStore {
    fn load(&self) -> Result<StoredTokens, StoreError> {
        let guard = self.tokens.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(guard.clone())
    }

    fn save(&self, tokens: &StoredTokens) -> Result<(), StoreError> {
        let mut guard = self.tokens.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = tokens.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.save(&StoredTokens::default())
    }
}

/// File-backed token store persisting sessions across process restarts
///
/// State is kept as a small JSON document under the user configuration
/// directory by default.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store backed by an explicit file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store at the default location under the user config directory
    pub fn default_location() -> Result<Self, StoreError> {
        let dir = dirs::config_dir().ok_or(StoreError::NoConfigDir)?;
        Ok(Self::new(dir.join("traindesk").join("session.json")))
    }

    /// The backing file path
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl TokenStore for FileStore {
    fn load(&self) -> Result<StoredTokens, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(StoredTokens::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, tokens: &StoredTokens) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(tokens)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
