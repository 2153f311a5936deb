use std::net::SocketAddr;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use modelpick_api::background;
use modelpick_api::config::ServerConfig;
use modelpick_api::router::build_app_router;
use modelpick_api::state::AppState;
use modelpick_engine::EngineConfig;

/// How long to wait for a background task after cancelling it.
const TASK_DRAIN: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    let engine_config = EngineConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Configuration loaded");

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = modelpick_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    modelpick_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    modelpick_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready, migrations applied");

    let state = AppState::new(pool.clone(), config.clone(), engine_config.clone());

    // Rollup refresher and guard janitor run for the lifetime of the server
    // and stop on the shared token once the listener drains.
    let cancel = CancellationToken::new();
    let refresher = tokio::spawn(background::rollup_refresh::run(
        pool,
        engine_config,
        cancel.clone(),
    ));
    let janitor = tokio::spawn(background::guard_janitor::run(
        state.guard.clone(),
        cancel.clone(),
    ));

    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Listener drained, stopping background tasks");
    cancel.cancel();
    let _ = tokio::time::timeout(TASK_DRAIN, refresher).await;
    let _ = tokio::time::timeout(TASK_DRAIN, janitor).await;
    tracing::info!("Shutdown complete");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "modelpick_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolves on SIGINT or, on Unix, SIGTERM, so both an interactive Ctrl-C
/// and a process manager stop the server cleanly.
async fn shutdown_signal() {
    let interrupt = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => tracing::info!("SIGINT received, shutting down"),
        () = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}
