//! End-to-end tests for the HTTP surface, driven through the real router.

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode, header};
use base64::{Engine, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tareas_server::config::{Config, LoginRateConfig};
use tareas_server::db::{self, AccountStore};
use tareas_server::routes::create_routes;
use tareas_server::state::AppState;
use tempfile::TempDir;
use tower::ServiceExt; // For `oneshot`

const TEMPLATE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates/tareas_bienvenida.html");

/// A router over a fresh SQLite file. Keep the TempDir alive for the whole test.
async fn create_test_server() -> (Router, AccountStore, TempDir) {
    create_test_server_with(PathBuf::from(TEMPLATE), generous_rate()).await
}

async fn create_test_server_with(template: PathBuf, rate: LoginRateConfig) -> (Router, AccountStore, TempDir) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("tareas.db").display());
    let pool = db::connect(&url).await.expect("failed to open test database");

    let accounts = AccountStore::new(pool);
    let state = AppState::new(accounts.clone(), template);
    (create_routes(state, rate), accounts, dir)
}

fn generous_rate() -> LoginRateConfig {
    LoginRateConfig {
        burst: 1000,
        period: Duration::from_secs(1),
    }
}

fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_tareas(auth: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().uri("/tareas");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, headers, body)
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).expect("body was not JSON"))
}

async fn register(app: &Router, user: &str, pass: &str) -> (StatusCode, Value) {
    send_json(app, post_json("/registro", json!({"usuario": user, "contraseña": pass}))).await
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_returns_created_with_username() {
    let (app, accounts, _dir) = create_test_server().await;

    let (status, body) = register(&app, "ana", "1234").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["usuario"], "ana");
    assert_eq!(body["mensaje"], "Usuario registrado exitosamente");

    let stored = accounts.find_by_username("ana").await.unwrap().unwrap();
    assert_ne!(stored.password_hash, "1234");
    assert!(!stored.password_hash.contains("1234"));
}

#[tokio::test]
async fn test_register_trims_username() {
    let (app, _, _dir) = create_test_server().await;

    let (status, body) = register(&app, "  ana  ", "1234").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["usuario"], "ana");
}

#[tokio::test]
async fn test_register_short_username_is_rejected() {
    let (app, accounts, _dir) = create_test_server().await;

    let (status, body) = register(&app, "an", "a-perfectly-fine-password").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "El nombre de usuario debe tener al menos 3 caracteres");
    assert_eq!(accounts.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_register_short_password_is_rejected() {
    let (app, _, _dir) = create_test_server().await;

    let (status, body) = register(&app, "ana", "123").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "La contraseña debe tener al menos 4 caracteres");
}

#[tokio::test]
async fn test_register_duplicate_is_rejected() {
    let (app, accounts, _dir) = create_test_server().await;

    let (first, _) = register(&app, "ana", "1234").await;
    let (second, body) = register(&app, "ana", "5678").await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "El usuario ya existe");
    assert_eq!(accounts.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_duplicate_registrations_create_one_row() {
    let (app, accounts, _dir) = create_test_server().await;

    let attempts = (0..6).map(|_| {
        let app = app.clone();
        tokio::spawn(async move { register(&app, "carrera", "1234").await.0 })
    });

    let mut created = 0;
    let mut rejected = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::BAD_REQUEST => rejected += 1,
            other => panic!("unexpected status {other}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(rejected, 5);
    assert_eq!(accounts.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_register_with_malformed_body_is_a_validation_error() {
    let (app, _, _dir) = create_test_server().await;

    let request = Request::builder()
        .method("POST")
        .uri("/registro")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("al menos 3"));
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let (app, _, _dir) = create_test_server().await;
    register(&app, "ana", "1234").await;

    let (status, body) = send_json(&app, post_json("/login", json!({"usuario": "ana", "contraseña": "1234"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usuario"], "ana");
    assert_eq!(body["mensaje"], "Credenciales válidas");
    assert_eq!(body["autenticacion"], "basic");
}

#[tokio::test]
async fn test_login_unknown_user_and_wrong_password_are_identical() {
    let (app, _, _dir) = create_test_server().await;
    register(&app, "ana", "1234").await;

    let (wrong_status, wrong_headers, wrong_body) = send(
        &app,
        post_json("/login", json!({"usuario": "ana", "contraseña": "wrong"})),
    )
    .await;
    let (unknown_status, unknown_headers, unknown_body) = send(
        &app,
        post_json("/login", json!({"usuario": "nadie", "contraseña": "wrong"})),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body, r#"{"error":"Credenciales inválidas"}"#.as_bytes().to_vec());
    assert_eq!(
        wrong_headers.get(header::CONTENT_TYPE),
        unknown_headers.get(header::CONTENT_TYPE)
    );
}

#[tokio::test]
async fn test_login_with_empty_body_is_unauthorized() {
    let (app, _, _dir) = create_test_server().await;

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Credenciales inválidas");
}

#[tokio::test]
async fn test_login_is_rate_limited_per_ip() {
    let rate = LoginRateConfig {
        burst: 2,
        period: Duration::from_secs(3600),
    };
    let (app, _, _dir) = create_test_server_with(PathBuf::from(TEMPLATE), rate).await;

    let attempt = || {
        Request::builder()
            .method("POST")
            .uri("/login")
            .header("x-forwarded-for", "198.51.100.9")
            .header("content-type", "application/json")
            .body(Body::from(json!({"usuario": "ana", "contraseña": "x"}).to_string()))
            .unwrap()
    };

    assert_eq!(send(&app, attempt()).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(send(&app, attempt()).await.0, StatusCode::UNAUTHORIZED);

    let (status, headers, body) = send(&app, attempt()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert!(headers.contains_key(header::RETRY_AFTER));
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Demasiados intentos"));
}

/// A login as it arrives straight from a client socket, no proxy headers.
fn login_from_peer(peer: SocketAddr, user: &str, pass: &str) -> Request<Body> {
    let mut request = post_json("/login", json!({"usuario": user, "contraseña": pass}));
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

#[tokio::test]
async fn test_default_login_limit_is_per_client_not_global() {
    let defaults = Config::from_lookup(|_| None).unwrap();
    let (app, _, _dir) = create_test_server_with(PathBuf::from(TEMPLATE), defaults.login_rate).await;
    register(&app, "ana", "1234").await;

    // More clients than the burst, each logging in once.
    for i in 0..(defaults.login_rate.burst + 3) {
        let peer = SocketAddr::from(([203, 0, 113, i as u8 + 1], 40000));
        let (status, body) = send_json(&app, login_from_peer(peer, "ana", "1234")).await;
        assert_eq!(status, StatusCode::OK, "client #{i} was throttled: {body}");
    }
}

#[tokio::test]
async fn test_default_login_limit_throttles_one_noisy_client() {
    let defaults = Config::from_lookup(|_| None).unwrap();
    let (app, _, _dir) = create_test_server_with(PathBuf::from(TEMPLATE), defaults.login_rate).await;
    register(&app, "ana", "1234").await;

    let noisy = SocketAddr::from(([203, 0, 113, 50], 40000));
    for _ in 0..defaults.login_rate.burst {
        let (status, _) = send_json(&app, login_from_peer(noisy, "ana", "1234")).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send_json(&app, login_from_peer(noisy, "ana", "1234")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].is_string());

    // Someone else is unaffected.
    let other = SocketAddr::from(([203, 0, 113, 51], 40000));
    let (status, _) = send_json(&app, login_from_peer(other, "ana", "1234")).await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Protected resource
// ============================================================================

#[tokio::test]
async fn test_tareas_renders_username_for_valid_credentials() {
    let (app, _, _dir) = create_test_server().await;
    register(&app, "ana", "1234").await;

    let (status, headers, body) = send(&app, get_tareas(Some(basic("ana", "1234")))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains(r#"<span class="user">ana</span>"#));
    assert!(!html.contains("{{ usuario }}"));
}

#[tokio::test]
async fn test_tareas_without_credentials_challenges() {
    let (app, _, _dir) = create_test_server().await;

    let (status, headers, body) = send(&app, get_tareas(None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        headers[header::WWW_AUTHENTICATE],
        r#"Basic realm="Sistema de Tareas""#
    );
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "Credenciales inválidas o ausentes");
}

#[tokio::test]
async fn test_tareas_with_wrong_or_unknown_credentials_challenges() {
    let (app, _, _dir) = create_test_server().await;
    register(&app, "ana", "1234").await;

    for auth in [basic("ana", "nope"), basic("nadie", "1234"), basic("ana", "")] {
        let (status, headers, _) = send(&app, get_tareas(Some(auth))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(headers.contains_key(header::WWW_AUTHENTICATE));
    }
}

#[tokio::test]
async fn test_tareas_with_bearer_scheme_challenges() {
    let (app, _, _dir) = create_test_server().await;

    let (status, headers, _) = send(&app, get_tareas(Some("Bearer abc".to_string()))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(headers.contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn test_tareas_with_missing_template_is_server_error() {
    let (app, _, _dir) =
        create_test_server_with(PathBuf::from("/no/such/template.html"), generous_rate()).await;
    register(&app, "ana", "1234").await;

    let (status, _, body) = send(&app, get_tareas(Some(basic("ana", "1234")))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "Archivo HTML no encontrado");
}

#[tokio::test]
async fn test_register_login_and_view_page_flow() {
    let (app, _, _dir) = create_test_server().await;

    let (status, body) = register(&app, "ana", "1234").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["usuario"], "ana");

    let (status, body) =
        send_json(&app, post_json("/login", json!({"usuario": "ana", "contraseña": "wrong"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Credenciales inválidas"}));

    let (status, _) =
        send_json(&app, post_json("/login", json!({"usuario": "ana", "contraseña": "1234"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(&app, get_tareas(Some(basic("ana", "1234")))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("ana"));
}

// ============================================================================
// Status, logout and fallbacks
// ============================================================================

#[tokio::test]
async fn test_status_endpoint() {
    let (app, _, _dir) = create_test_server().await;

    let request = Request::builder().uri("/status").body(Body::empty()).unwrap();
    let (status, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["autenticacion"], "basic");
    assert_eq!(body["database"], "Connected");
    assert!(body["endpoints"]["GET /tareas"].is_string());
}

#[tokio::test]
async fn test_logout_accepts_get_and_post() {
    let (app, _, _dir) = create_test_server().await;

    for method in ["GET", "POST"] {
        let request = Request::builder()
            .method(method)
            .uri("/logout")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send_json(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["mensaje"].as_str().unwrap().contains("no hay sesión"));
    }
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (app, _, _dir) = create_test_server().await;

    let request = Request::builder().uri("/nada").body(Body::empty()).unwrap();
    let (status, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint no encontrado");
}

#[tokio::test]
async fn test_wrong_method_is_json_405() {
    let (app, _, _dir) = create_test_server().await;

    let request = Request::builder()
        .method("GET")
        .uri("/registro")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Método no permitido para este endpoint");
}
