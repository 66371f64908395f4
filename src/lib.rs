//! TrainDesk Auth - Client Session Library
//!
//! Client-side authentication session lifecycle for the TrainDesk
//! sports-training administration dashboard: token storage, validation,
//! session management, an authenticated HTTP client with a single silent
//! refresh-and-retry, a reducer-style auth state machine, and a route guard.
//! The backend is an opaque REST collaborator reached over HTTP.
//!
//! # Module Structure
//!
//! - **`config`** - Backend origin resolution
//! - **`types`** - Wire types and the role/landing-route table
//! - **`store`** - Durable token storage (in-memory and file-backed)
//! - **`token`** - Access-token expiry validation
//! - **`session`** - Session manager pairing storage with the bearer header
//! - **`client`** - Authenticated HTTP client with refresh-retry
//! - **`auth`** - Reducer-driven state machine and the orchestrating service
//! - **`guard`** - Route guard for protected views
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use traindesk_auth::auth::AuthService;
//! use traindesk_auth::client::ApiClient;
//! use traindesk_auth::config::Config;
//! use traindesk_auth::session::SessionManager;
//! use traindesk_auth::store::FileStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(FileStore::default_location()?);
//! let session = SessionManager::new(store);
//! let client = ApiClient::new(Config::new(), session.clone());
//! let service = Arc::new(AuthService::new(client, session));
//!
//! service.listen_for_forced_logout();
//! service.initialize().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! All operations run on one cooperative event loop; suspension points are
//! exactly the network calls. The startup resolution dispatches its single
//! `Initialize` only after storage has settled, so the route guard never
//! observes a ready state ahead of the store.
//!
//! # Error Handling
//!
//! Asynchronous failures are caught at the operation boundary and converted
//! to state transitions or return values. Login reports its outcome through
//! a result descriptor and never propagates an error past that boundary.

/// Reducer-driven auth state machine and orchestration service
pub mod auth;

/// Authenticated HTTP client with refresh-retry
pub mod client;

/// Backend endpoint configuration
pub mod config;

/// Error types and backend error-payload flattening
pub mod error;

/// Route guarding for protected views
pub mod guard;

/// Session lifecycle orchestration
pub mod session;

/// Durable client-side token storage
pub mod store;

/// Access-token validation
pub mod token;

/// Wire types and the role table
pub mod types;

pub use auth::{AuthAction, AuthService, AuthState, LoginOutcome};
pub use client::{ApiClient, ApiRequest};
pub use config::Config;
pub use error::ApiError;
pub use guard::{GuardDecision, RouteGuard};
pub use session::SessionManager;
pub use store::{FileStore, MemoryStore, StoredTokens, TokenStore};
pub use token::is_token_valid;
pub use types::{Role, TokenResponse, UserProfile};
