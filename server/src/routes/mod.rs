use crate::config::LoginRateConfig;
use crate::handlers::{
    auth::{login, logout, registro},
    fallback::{method_not_allowed, not_found, panic_response},
    status::status,
    tareas::tareas,
};
use crate::middleware::rate_limit;
use crate::state::AppState;
use axum::{
    Router,
    handler::Handler,
    routing::{get, post},
};
use tower_governor::GovernorLayer;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_routes(state: AppState, login_rate: LoginRateConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let login_conf = rate_limit::create_login_config(login_rate);

    Router::new()
        .route("/status", get(status))
        .route("/registro", post(registro))
        .route(
            "/login",
            post(login.layer(
                GovernorLayer::new(login_conf).error_handler(rate_limit::rate_limited_response),
            )),
        )
        .route("/tareas", get(tareas))
        .route("/logout", get(logout).post(logout))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}
