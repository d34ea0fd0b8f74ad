use crate::error::{ApiError, ApiResult};
use crate::models::account::{CredentialsRequest, LoginResponse, MessageResponse, RegisterResponse};
use crate::state::AppState;
use crate::utils::password::{hash_password_blocking, verify_password_blocking};
use crate::utils::validation::validate_registration;
use axum::{Json, body::Bytes, extract::State, http::StatusCode};

/// `POST /registro`
///
/// Validates, hashes and inserts. The body is parsed leniently: a missing or
/// malformed body just fails validation like an empty username would.
pub async fn registro(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let payload = CredentialsRequest::from_body(&body);

    // 1. Validate input
    let username = validate_registration(&payload.usuario, &payload.contrasena)
        .map_err(ApiError::Validation)?
        .to_string();

    // 2. Cheap duplicate check so we don't pay for a hash we'll throw away.
    // The insert below still maps a UNIQUE violation in case of a race.
    if state.accounts.find_by_username(&username).await?.is_some() {
        return Err(ApiError::UsernameTaken);
    }

    // 3. Hash password
    let password_hash = hash_password_blocking(payload.contrasena).await?;

    // 4. Create account
    let account = state.accounts.insert(&username, &password_hash).await?;
    tracing::info!(username = %account.username, id = account.id, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            mensaje: "Usuario registrado exitosamente",
            usuario: account.username,
        }),
    ))
}

/// `POST /login`
///
/// Only a pre-check: nothing is issued. The client keeps the credentials and
/// resends them with Basic auth on every protected request.
pub async fn login(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<LoginResponse>> {
    let payload = CredentialsRequest::from_body(&body);
    let username = payload.usuario.trim();

    // 1. Fetch account
    let account = state.accounts.find_by_username(username).await?;

    // 2. Verify password. Unknown user and wrong password share one error.
    let stored_hash = account.as_ref().map(|a| a.password_hash.clone());
    let valid = verify_password_blocking(payload.contrasena, stored_hash).await?;

    let account = match account {
        Some(account) if valid => account,
        _ => {
            tracing::debug!(username, "login rejected");
            return Err(ApiError::InvalidCredentials);
        }
    };

    Ok(Json(LoginResponse {
        mensaje: "Credenciales válidas",
        usuario: account.username,
        autenticacion: "basic",
    }))
}

/// `GET|POST /logout`
///
/// Nothing to invalidate server-side; the client drops its own credentials.
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse {
        mensaje: "Autenticación básica: no hay sesión que cerrar. Cierra el cliente o limpia las credenciales.",
    })
}
