/**
 * Shared Types Module
 *
 * Wire types for the authentication endpoints plus the role/landing-route
 * table used after login.
 */

use serde::{Deserialize, Serialize};

/// Credential exchange request (`POST /api/token/`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Credential exchange response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub tipo_usuario: Option<String>,
}

/// Token renewal request (`POST /api/token/refresh/`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Token renewal response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// Authenticated user profile (`GET /Usuarios/profile/`)
///
/// The profile is owned by the backend and mostly opaque to this crate; only
/// the fields routing decisions read are named, everything else is carried
/// verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub tipo_usuario: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Well-known application routes
pub mod routes {
    /// Application root, landing target for unrecognized roles
    pub const ROOT: &str = "/";
    /// Login entry point
    pub const LOGIN: &str = "/login";
    /// Home dashboard
    pub const HOME: &str = "/home";
    /// Athlete dashboard
    pub const ATHLETE_DASHBOARD: &str = "/athlete/dashboard";
    /// Training programs module
    pub const TRAINING_PROGRAMS: &str = "/training-programs";
}

/// Server-assigned user category (`tipo_usuario`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Administrador,
    Atleta,
    ProfesionalSalud,
    Entrenador,
}

impl Role {
    /// Parse a raw `tipo_usuario` tag
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "Administrador" => Some(Role::Administrador),
            "Atleta" => Some(Role::Atleta),
            "Profesional Salud" => Some(Role::ProfesionalSalud),
            "Entrenador" => Some(Role::Entrenador),
            _ => None,
        }
    }

    /// Post-login landing route for this role
    pub fn landing_route(&self) -> &'static str {
        match self {
            Role::Administrador | Role::ProfesionalSalud => routes::HOME,
            Role::Atleta => routes::ATHLETE_DASHBOARD,
            Role::Entrenador => routes::TRAINING_PROGRAMS,
        }
    }
}

/// Landing route for a raw role tag; unrecognized or missing roles land at
/// the application root.
pub fn landing_route(tag: Option<&str>) -> &'static str {
    tag.and_then(Role::parse)
        .map(|role| role.landing_route())
        .unwrap_or(routes::ROOT)
}
