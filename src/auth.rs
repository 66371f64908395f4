/**
 * Auth State Machine
 *
 * Reducer-driven session state plus the service that orchestrates startup
 * token resolution, login, logout, and the forced-logout listener. The
 * service is the single writer of the state; consumers take snapshots.
 */

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::task::JoinHandle;

use crate::client::{ApiClient, ApiRequest, PROFILE_PATH, TOKEN_PATH};
use crate::error::ApiError;
use crate::session::SessionManager;
use crate::store::StoredTokens;
use crate::token;
use crate::types::{landing_route, TokenResponse, UserProfile};

/// The client-side belief about the current user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    /// Whether a user is signed in
    pub is_authenticated: bool,
    /// Becomes true exactly once, after the first startup resolution lands
    pub is_initialized: bool,
    /// True only while a login call is in flight
    pub is_loading: bool,
    /// Last login failure, cleared on a new attempt or on success
    pub error: Option<String>,
    /// Profile record fetched from the backend
    pub user: Option<UserProfile>,
}

/// State transitions
#[derive(Debug, Clone)]
pub enum AuthAction {
    /// Startup token resolution finished (fired exactly once per startup)
    Initialize {
        is_authenticated: bool,
        user: Option<UserProfile>,
    },
    /// Credentials submitted
    LoginRequest,
    /// Backend accepted the credentials
    LoginSuccess { user: UserProfile },
    /// Backend rejected the credentials or the network failed
    LoginError { message: String },
    /// User action or forced session invalidation
    Logout,
}

/// Pure reducer over [`AuthState`]
///
/// Exhaustive over every action, so adding a transition is a compile error
/// until it is handled.
pub fn reduce(state: &AuthState, action: AuthAction) -> AuthState {
    match action {
        AuthAction::Initialize {
            is_authenticated,
            user,
        } => AuthState {
            is_authenticated,
            is_initialized: true,
            is_loading: false,
            user,
            error: state.error.clone(),
        },
        AuthAction::LoginRequest => AuthState {
            is_loading: true,
            error: None,
            ..state.clone()
        },
        AuthAction::LoginSuccess { user } => AuthState {
            is_authenticated: true,
            is_loading: false,
            error: None,
            user: Some(user),
            is_initialized: state.is_initialized,
        },
        // Authentication stays as it was; a rejected login never flips it on
        AuthAction::LoginError { message } => AuthState {
            is_loading: false,
            error: Some(message),
            ..state.clone()
        },
        // Initialization survives logout; the guard must not fall back to Loading
        AuthAction::Logout => AuthState {
            is_authenticated: false,
            user: None,
            ..state.clone()
        },
    }
}

/// Result descriptor returned by [`AuthService::login`]
///
/// Login never fails with an `Err`; outcomes are always reported here.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub success: bool,
    pub error: Option<String>,
    /// Role-based landing route, present on success
    pub redirect: Option<&'static str>,
}

impl LoginOutcome {
    fn failed(error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
            redirect: None,
        }
    }
}

/// Message returned when a login is submitted while another is in flight
pub const LOGIN_IN_FLIGHT: &str = "A sign-in attempt is already in progress.";

/// Orchestrates the session lifecycle around the reducer
pub struct AuthService {
    client: ApiClient,
    session: SessionManager,
    state: Arc<RwLock<AuthState>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl AuthService {
    pub fn new(client: ApiClient, session: SessionManager) -> Self {
        Self {
            client,
            session,
            state: Arc::new(RwLock::new(AuthState::default())),
            listener: Mutex::new(None),
        }
    }

    /// Snapshot of the current session state
    pub fn state(&self) -> AuthState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The refresh-aware HTTP client, for feature code issuing API calls
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// The session manager backing this service
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Startup token resolution
    ///
    /// Runs once before any protected content is shown. Every path dispatches
    /// exactly one `Initialize`; the route guard stays in `Loading` until it
    /// lands. Startup failures are recovered locally and never surface as
    /// user-visible errors.
    pub async fn initialize(&self) {
        let tokens = match self.session.store().load() {
            Ok(tokens) => tokens,
            Err(err) => {
                tracing::warn!("[Auth] token store unreadable at startup: {}", err);
                StoredTokens::default()
            }
        };

        let valid_access = tokens
            .access
            .as_deref()
            .filter(|access| token::is_token_valid(access));

        if let Some(access) = valid_access {
            self.session.apply_bearer(access);
            match self.fetch_profile().await {
                Ok(user) => {
                    tracing::info!("[Auth] session restored from stored access token");
                    self.dispatch(AuthAction::Initialize {
                        is_authenticated: true,
                        user: Some(user),
                    });
                    return;
                }
                Err(err) => {
                    tracing::debug!("[Auth] startup profile fetch failed: {}", err);
                }
            }
        } else if let Some(refresh) = tokens.refresh.as_deref() {
            match self.client.refresh_access(refresh).await {
                Ok(access) => {
                    let rotated = self.session.rotate_access(&access);
                    if rotated.is_ok() {
                        if let Ok(user) = self.fetch_profile().await {
                            tracing::info!("[Auth] session restored via token refresh");
                            self.dispatch(AuthAction::Initialize {
                                is_authenticated: true,
                                user: Some(user),
                            });
                            return;
                        }
                    }
                }
                Err(err) => {
                    tracing::debug!("[Auth] startup token refresh failed: {}", err);
                }
            }
        }

        // No usable session; settle storage before the single Initialize
        if let Err(err) = self.session.clear_session() {
            tracing::warn!("[Auth] failed to clear token store at startup: {}", err);
        }
        tracing::info!("[Auth] starting unauthenticated");
        self.dispatch(AuthAction::Initialize {
            is_authenticated: false,
            user: None,
        });
    }

    /// Exchange credentials for a session
    ///
    /// A submission while another login is in flight is rejected up front.
    /// The in-flight check and the `LoginRequest` transition happen under one
    /// state lock, so simultaneous submissions cannot both pass.
    pub async fn login(&self, username: &str, password: &str) -> LoginOutcome {
        if !self.begin_login() {
            tracing::debug!("[Auth] login rejected: another attempt is in flight");
            return LoginOutcome::failed(LOGIN_IN_FLIGHT.to_string());
        }

        let body = serde_json::json!({ "username": username, "password": password });
        let response = self.client.send_once(ApiRequest::post(TOKEN_PATH, body)).await;

        let tokens = match response.and_then(|value| {
            serde_json::from_value::<TokenResponse>(value).map_err(ApiError::from)
        }) {
            Ok(tokens) => tokens,
            Err(err) => return self.fail_login(err),
        };

        if let Err(err) = self.session.set_session(&tokens) {
            tracing::warn!("[Auth] failed to persist session: {}", err);
            return self.fail_login(ApiError::from(err));
        }

        match self.fetch_profile().await {
            Ok(user) => {
                let redirect = landing_route(tokens.tipo_usuario.as_deref());
                tracing::info!("[Auth] login succeeded, landing at {}", redirect);
                self.dispatch(AuthAction::LoginSuccess { user });
                LoginOutcome {
                    success: true,
                    error: None,
                    redirect: Some(redirect),
                }
            }
            Err(err) => self.fail_login(err),
        }
    }

    /// End the session
    ///
    /// Purely local: the token model is stateless, the server tracks no
    /// revocation list.
    pub fn logout(&self) {
        if let Err(err) = self.session.clear_session() {
            tracing::warn!("[Auth] failed to clear token store on logout: {}", err);
        }
        self.dispatch(AuthAction::Logout);
        tracing::info!("[Auth] logged out");
    }

    /// Subscribe to the client's forced-logout broadcast for the lifetime of
    /// this service
    ///
    /// The listener task holds only a weak reference to the state and is
    /// aborted when the service is dropped.
    pub fn listen_for_forced_logout(&self) {
        let mut rx = self.client.subscribe_logout();
        let weak = Arc::downgrade(&self.state);
        let handle = tokio::spawn(async move {
            while rx.recv().await.is_ok() {
                let Some(state) = weak.upgrade() else { break };
                tracing::info!("[Auth] forced logout signal received");
                // The client already cleared the store before signaling
                let mut guard = state.write().unwrap_or_else(PoisonError::into_inner);
                *guard = reduce(&guard, AuthAction::Logout);
            }
        });
        let mut slot = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    /// Mark a login in flight unless one already is, atomically
    fn begin_login(&self) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.is_loading {
            return false;
        }
        *state = reduce(&state, AuthAction::LoginRequest);
        true
    }

    fn fail_login(&self, err: ApiError) -> LoginOutcome {
        let message = err.user_message();
        tracing::debug!("[Auth] login failed: {}", err);
        self.dispatch(AuthAction::LoginError {
            message: message.clone(),
        });
        LoginOutcome::failed(message)
    }

    async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        self.client.get_json(PROFILE_PATH).await
    }

    fn dispatch(&self, action: AuthAction) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = reduce(&state, action);
    }
}

impl Drop for AuthService {
    fn drop(&mut self) {
        let mut slot = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> UserProfile {
        UserProfile {
            id: Some(1),
            username: Some(name.to_string()),
            tipo_usuario: None,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_default_state() {
        let state = AuthState::default();
        assert!(!state.is_authenticated);
        assert!(!state.is_initialized);
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert!(state.user.is_none());
    }

    #[test]
    fn test_initialize_authenticated() {
        let state = reduce(
            &AuthState::default(),
            AuthAction::Initialize {
                is_authenticated: true,
                user: Some(profile("ana")),
            },
        );
        assert!(state.is_authenticated);
        assert!(state.is_initialized);
        assert!(!state.is_loading);
        assert_eq!(state.user.as_ref().unwrap().username.as_deref(), Some("ana"));
    }

    #[test]
    fn test_initialize_unauthenticated() {
        let state = reduce(
            &AuthState::default(),
            AuthAction::Initialize {
                is_authenticated: false,
                user: None,
            },
        );
        assert!(!state.is_authenticated);
        assert!(state.is_initialized);
        assert!(state.user.is_none());
    }

    #[test]
    fn test_login_request_sets_loading_and_clears_error() {
        let previous = AuthState {
            error: Some("old failure".to_string()),
            ..AuthState::default()
        };
        let state = reduce(&previous, AuthAction::LoginRequest);
        assert!(state.is_loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_login_success() {
        let previous = reduce(&AuthState::default(), AuthAction::LoginRequest);
        let state = reduce(
            &previous,
            AuthAction::LoginSuccess {
                user: profile("ana"),
            },
        );
        assert!(state.is_authenticated);
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert!(state.user.is_some());
    }

    #[test]
    fn test_login_error_never_authenticates() {
        let previous = reduce(&AuthState::default(), AuthAction::LoginRequest);
        let state = reduce(
            &previous,
            AuthAction::LoginError {
                message: "bad credentials".to_string(),
            },
        );
        assert!(!state.is_authenticated);
        assert!(!state.is_loading);
        assert_eq!(state.error.as_deref(), Some("bad credentials"));
    }

    #[test]
    fn test_logout_keeps_initialized() {
        let authenticated = AuthState {
            is_authenticated: true,
            is_initialized: true,
            user: Some(profile("ana")),
            ..AuthState::default()
        };
        let state = reduce(&authenticated, AuthAction::Logout);
        assert!(!state.is_authenticated);
        assert!(state.user.is_none());
        assert!(state.is_initialized);
    }
}
