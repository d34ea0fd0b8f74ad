use crate::state::AppState;
use axum::{Json, extract::State};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
    pub autenticacion: &'static str,
    pub database: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

/// Every public route with a short description. Also printed at startup.
pub const ENDPOINTS: [(&str, &str); 5] = [
    ("POST /registro", "Registrar nuevo usuario"),
    ("POST /login", "Validar credenciales"),
    ("GET /tareas", "Página de tareas (basic auth)"),
    ("POST /logout", "Mensaje informativo"),
    ("GET /status", "Estado del servidor"),
];

/// `GET /status`
///
/// Liveness plus a description of what the server offers. Always 200: a dead
/// database is reported in the body, not the status code.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let database = if state.accounts.ping().await {
        "Connected"
    } else {
        "Disconnected"
    };

    Json(StatusResponse {
        status: "ok",
        message: "Servidor funcionando correctamente",
        version: "1.1",
        autenticacion: "basic",
        database,
        endpoints: ENDPOINTS.into_iter().collect(),
    })
}
