//! Session lifecycle orchestration
//!
//! The session manager is the only component that writes the token store and
//! the default bearer header together. Store writes happen before header
//! updates, so anything that observes the header can rely on storage having
//! settled.

use std::sync::{Arc, PoisonError, RwLock};

use crate::store::{StoreError, StoredTokens, TokenStore};
use crate::types::TokenResponse;

/// Orchestrates the active session: token persistence plus the default
/// authorization header consumed by [`ApiClient`](crate::client::ApiClient).
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn TokenStore>,
    bearer: Arc<RwLock<Option<String>>>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            bearer: Arc::new(RwLock::new(None)),
        }
    }

    /// Persist a freshly issued token pair and arm the default header
    pub fn set_session(&self, tokens: &TokenResponse) -> Result<(), StoreError> {
        self.store.save(&StoredTokens {
            access: Some(tokens.access.clone()),
            refresh: tokens.refresh.clone(),
            tipo_usuario: tokens.tipo_usuario.clone(),
        })?;
        self.set_bearer(Some(tokens.access.clone()));
        tracing::debug!("[Session] session established");
        Ok(())
    }

    /// Persist a refreshed access token, keeping the existing refresh token
    pub fn rotate_access(&self, access: &str) -> Result<(), StoreError> {
        self.store.rotate_access(access)?;
        self.set_bearer(Some(access.to_string()));
        tracing::debug!("[Session] access token rotated");
        Ok(())
    }

    /// Arm the default header for an already-persisted access token
    pub fn apply_bearer(&self, access: &str) {
        self.set_bearer(Some(access.to_string()));
    }

    /// Drop the session: clear storage, then the default header
    ///
    /// The header is disarmed even when the store refuses the clear, so a
    /// failing store cannot keep a dead session's bearer armed.
    pub fn clear_session(&self) -> Result<(), StoreError> {
        let cleared = self.store.clear();
        self.set_bearer(None);
        tracing::debug!("[Session] session cleared");
        cleared
    }

    /// The current default bearer value, if a session is armed
    pub fn bearer(&self) -> Option<String> {
        self.bearer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The underlying token store
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    fn set_bearer(&self, value: Option<String>) {
        let mut slot = self.bearer.write().unwrap_or_else(PoisonError::into_inner);
        *slot = value;
    }
}
