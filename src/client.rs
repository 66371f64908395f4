/**
 * Authenticated HTTP Client
 *
 * Wraps reqwest with the backend origin, the default bearer header, and a
 * single silent refresh-and-retry on authentication failure. When a refresh
 * attempt is exhausted the client clears the token store and raises the
 * forced-logout signal.
 */

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::error::ApiError;
use crate::session::SessionManager;
use crate::types::{RefreshRequest, RefreshResponse};

/// Credential exchange endpoint
pub const TOKEN_PATH: &str = "/api/token/";
/// Token renewal endpoint
pub const TOKEN_REFRESH_PATH: &str = "/api/token/refresh/";
/// Authenticated profile endpoint
pub const PROFILE_PATH: &str = "/Usuarios/profile/";

/// Capacity of the forced-logout broadcast channel
const LOGOUT_CHANNEL_CAPACITY: usize = 8;

/// A request descriptor, retained only across the single permitted retry
///
/// The `retried` flag guarantees a request is never resubmitted more than
/// once, even against a persistently invalid refresh token.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        let mut request = Self::new(Method::POST, path);
        request.body = Some(body);
        request
    }
}

/// HTTP client wrapper issuing authenticated requests
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: Config,
    session: SessionManager,
    logout_tx: broadcast::Sender<()>,
}

impl ApiClient {
    pub fn new(config: Config, session: SessionManager) -> Self {
        let (logout_tx, _) = broadcast::channel(LOGOUT_CHANNEL_CAPACITY);
        Self {
            http: Client::new(),
            config,
            session,
            logout_tx,
        }
    }

    /// Subscribe to the forced-logout signal
    ///
    /// The signal fires when an authentication failure could not be recovered
    /// by a token refresh. The store is already cleared when it fires.
    pub fn subscribe_logout(&self) -> broadcast::Receiver<()> {
        self.logout_tx.subscribe()
    }

    /// Issue `request`, refreshing the access token and retrying exactly once
    /// on an authentication failure
    ///
    /// All non-auth failures propagate unchanged. An auth failure with no
    /// refresh token on hand propagates without a refresh attempt.
    pub async fn send(&self, mut request: ApiRequest) -> Result<serde_json::Value, ApiError> {
        let outcome = self.dispatch(&request).await;
        let original_failure = match outcome {
            Err(err) if err.is_auth_failure() && !request.retried => err,
            other => return other,
        };
        request.retried = true;

        let Some(refresh) = self.session.store().refresh_token() else {
            tracing::debug!("[Api] auth failure with no refresh token on hand");
            return Err(original_failure);
        };

        match self.refresh_access(&refresh).await {
            Ok(access) => {
                // A store that cannot persist the rotation must not block the
                // retry; the fresh token is still good for this process
                if let Err(err) = self.session.rotate_access(&access) {
                    tracing::warn!("[Api] failed to persist refreshed token: {}", err);
                    self.session.apply_bearer(&access);
                }
                tracing::debug!(
                    "[Api] access token refreshed, retrying {} {}",
                    request.method,
                    request.path
                );
                self.dispatch(&request).await
            }
            Err(err) => {
                tracing::warn!("[Api] token refresh failed: {}", err);
                // The caller gets the original failure and the signal fires
                // even if the store refuses the clear
                if let Err(err) = self.session.clear_session() {
                    tracing::warn!("[Api] failed to clear token store: {}", err);
                }
                // Nobody listening is fine; the send result is informational
                let _ = self.logout_tx.send(());
                Err(original_failure)
            }
        }
    }

    /// Issue `request` without the refresh-and-retry machinery
    ///
    /// Used for the credential exchange itself: a rejected login must surface
    /// as-is rather than trigger a refresh with leftover tokens.
    pub async fn send_once(&self, request: ApiRequest) -> Result<serde_json::Value, ApiError> {
        self.dispatch(&request).await
    }

    /// GET a JSON resource through the retry-aware path
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.send(ApiRequest::get(path)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// POST a JSON body through the retry-aware path
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ApiError> {
        let value = self.send(ApiRequest::post(path, body)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Exchange the refresh token for a new access token
    ///
    /// Deliberately bypasses [`send`](Self::send): an auth failure here must
    /// not recurse into the retry path.
    pub(crate) async fn refresh_access(&self, refresh: &str) -> Result<String, ApiError> {
        let url = self.config.api_url(TOKEN_REFRESH_PATH);
        let response = self
            .http
            .post(&url)
            .json(&RefreshRequest {
                refresh: refresh.to_string(),
            })
            .send()
            .await?;
        let value = Self::normalize(response).await?;
        let parsed: RefreshResponse = serde_json::from_value(value)?;
        Ok(parsed.access)
    }

    /// Single HTTP round trip with the default bearer header attached
    async fn dispatch(&self, request: &ApiRequest) -> Result<serde_json::Value, ApiError> {
        let url = self.config.api_url(&request.path);
        let mut builder = self.http.request(request.method.clone(), &url);
        if let Some(bearer) = self.session.bearer() {
            builder = builder.header("Authorization", format!("Bearer {}", bearer));
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        Self::normalize(response).await
    }

    /// Normalize a response: success becomes the parsed payload, failure
    /// becomes status plus whatever payload was present
    async fn normalize(response: reqwest::Response) -> Result<serde_json::Value, ApiError> {
        let status = response.status();
        if status.is_success() {
            if status == StatusCode::NO_CONTENT {
                return Ok(serde_json::Value::Null);
            }
            Ok(response.json().await?)
        } else {
            let body = response.json::<serde_json::Value>().await.ok();
            Err(ApiError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}
