use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Realm advertised in the `WWW-Authenticate` challenge for `/tareas`.
pub const REALM_CHALLENGE: &str = r#"Basic realm="Sistema de Tareas""#;

/// Every failure a handler can produce. Expected violations carry their own
/// status; anything unexpected collapses into a 500 with a generic message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("El usuario ya existe")]
    UsernameTaken,

    /// Unknown user and wrong password both end up here, so the payload is identical.
    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("Credenciales inválidas o ausentes")]
    Unauthorized,

    #[error("Endpoint no encontrado")]
    NotFound,

    #[error("Método no permitido para este endpoint")]
    MethodNotAllowed,

    #[error("Demasiados intentos. Intenta de nuevo en {retry_after} segundos")]
    RateLimited { retry_after: u64 },

    #[error("Archivo HTML no encontrado")]
    TemplateMissing,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::UsernameTaken => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::TemplateMissing
            | ApiError::Database(_)
            | ApiError::Hashing(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message that goes on the wire. Internal causes stay in the logs.
    fn public_message(&self) -> String {
        match self {
            ApiError::Database(_) | ApiError::Hashing(_) | ApiError::Internal(_) => {
                INTERNAL_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

pub const INTERNAL_MESSAGE: &str = "Error interno del servidor";

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let mut response = (status, Json(json!({ "error": self.public_message() }))).into_response();

        match self {
            ApiError::Unauthorized => {
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static(REALM_CHALLENGE),
                );
            }
            ApiError::RateLimited { retry_after } => {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
            }
            _ => {}
        }

        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
