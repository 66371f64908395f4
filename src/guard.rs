//! Route guarding for protected views
//!
//! The guard blocks protected content until the startup resolution lands,
//! then either allows rendering or redirects to the login entry point with
//! the originally requested path preserved for post-login return.
//!
//! The reducer state is the single source of truth here: the session manager
//! settles storage before every dispatch, so no fallback check against the
//! token store is needed.

use crate::auth::AuthState;
use crate::types::routes;

/// Decision produced for a navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Startup has not settled; render a blocking indicator, do not navigate
    Loading,
    /// Render the protected content
    Allow,
    /// Send the visitor to the login entry point
    RedirectToLogin {
        /// Login route carrying the originally requested path
        target: String,
    },
}

/// Gate for protected views
///
/// `ready` latches once `is_initialized` is first observed, so a slow startup
/// never flashes a redirect, and a later logout never falls back to `Loading`.
#[derive(Debug, Default)]
pub struct RouteGuard {
    ready: bool,
}

impl RouteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the startup resolution has been observed
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Evaluate a navigation attempt to `requested_path`
    pub fn evaluate(&mut self, state: &AuthState, requested_path: &str) -> GuardDecision {
        if !self.ready {
            if !state.is_initialized {
                return GuardDecision::Loading;
            }
            self.ready = true;
        }

        if state.is_authenticated {
            GuardDecision::Allow
        } else {
            tracing::debug!("[Guard] redirecting {} to login", requested_path);
            GuardDecision::RedirectToLogin {
                target: login_redirect(requested_path),
            }
        }
    }
}

/// Login route carrying the originally requested path in a `next` parameter
pub fn login_redirect(requested_path: &str) -> String {
    format!(
        "{}?next={}",
        routes::LOGIN,
        urlencoding::encode(requested_path)
    )
}
