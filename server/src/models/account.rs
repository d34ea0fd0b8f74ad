use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `usuarios` table. Columns are aliased to these names in every query.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /registro` and `POST /login`.
///
/// Both fields default to empty so a missing key behaves like an empty string,
/// which the handlers then reject with the usual validation or credential error.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub usuario: String,
    #[serde(default, rename = "contraseña")]
    pub contrasena: String,
}

impl CredentialsRequest {
    /// Parses a raw body. Anything that isn't a JSON object with string fields
    /// is treated as an empty request rather than a framework rejection.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub mensaje: &'static str,
    pub usuario: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub mensaje: &'static str,
    pub usuario: String,
    pub autenticacion: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub mensaje: &'static str,
}
