//! Common test utilities and helpers
//!
//! Shared fixtures for the HTTP-level tests: signed test tokens, a wired-up
//! service against a wiremock backend, and mock helpers for the three
//! authentication endpoints.

use std::sync::Arc;

use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use traindesk_auth::auth::AuthService;
use traindesk_auth::client::ApiClient;
use traindesk_auth::config::Config;
use traindesk_auth::session::SessionManager;
use traindesk_auth::store::MemoryStore;

#[derive(Serialize)]
struct TestClaims {
    exp: i64,
    user_id: i64,
}

/// Mint a signed JWT expiring `expires_in_secs` from now (may be negative)
pub fn mint_token(expires_in_secs: i64) -> String {
    let claims = TestClaims {
        exp: chrono::Utc::now().timestamp() + expires_in_secs,
        user_id: 7,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("token encodes")
}

/// Service, session, and store wired against a mock backend
pub struct Harness {
    pub service: Arc<AuthService>,
    pub session: SessionManager,
    pub store: Arc<MemoryStore>,
}

/// Initialize test logging once per process (`RUST_LOG` controls verbosity)
pub fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn harness(server: &MockServer) -> Harness {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let session = SessionManager::new(store.clone());
    let config = Config::builder()
        .api_url(server.uri())
        .build()
        .expect("mock server URL is valid");
    let client = ApiClient::new(config, session.clone());
    Harness {
        service: Arc::new(AuthService::new(client, session.clone())),
        session,
        store,
    }
}

/// Standard profile payload returned by the mock backend
pub fn profile_body() -> serde_json::Value {
    serde_json::json!({
        "id": 7,
        "username": "coach.ana",
        "tipo_usuario": "Entrenador",
        "email": "ana@club.example"
    })
}

/// Mount `GET /Usuarios/profile/` expecting the given bearer token
pub async fn mount_profile(server: &MockServer, bearer: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/Usuarios/profile/"))
        .and(header("Authorization", format!("Bearer {}", bearer).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Mount `POST /api/token/refresh/` answering `refresh` with `access`
pub async fn mount_refresh_success(
    server: &MockServer,
    refresh: &str,
    access: &str,
    expected_calls: u64,
) {
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .and(body_json(serde_json::json!({ "refresh": refresh })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access": access
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Mount `POST /api/token/refresh/` rejecting every renewal attempt
pub async fn mount_refresh_failure(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "detail": "Token is invalid or expired"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Guard against any renewal traffic at all
pub async fn forbid_refresh(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}
