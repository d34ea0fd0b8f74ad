use tareas_server::{
    config::Config,
    db::{self, AccountStore},
    handlers::status::ENDPOINTS,
    routes,
    state::AppState,
};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration (.env first, then the process environment).
    let config = Config::from_env()?;

    // 2. Sentry, only if a DSN was given. The guard has to live as long as main.
    let _guard = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((dsn, sentry::ClientOptions {
            release: sentry::release_name!(),
            send_default_pii: false,
            ..Default::default()
        }))
    });

    // 3. Logging. RUST_LOG wins; otherwise debug for us and tower_http.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "tareas_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    tracing::info!("Starting task manager server...");

    // 4. Database. Creates the file and the usuarios table if needed.
    let db = db::connect(&config.database_url).await?;
    tracing::info!(url = %config.database_url, "SQLite database ready");

    if !config.template_path.exists() {
        tracing::warn!(
            path = %config.template_path.display(),
            "welcome template not found; GET /tareas will answer 500 until it exists"
        );
    }

    // 5. Router
    let state = AppState::new(AccountStore::new(db), config.template_path.clone());
    let app = routes::create_routes(state, config.login_rate);

    tracing::info!("Available endpoints:");
    for (route, description) in ENDPOINTS {
        tracing::info!("  {} - {}", route, description);
    }

    // 6. Serve
    tracing::info!("Listening on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    // Connect info gives the login limiter the peer address when there's no proxy.
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
    }
}
