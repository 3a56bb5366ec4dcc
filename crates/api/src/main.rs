use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use authgate_core::notify::LogOnlyNotifier;
use authgate_core::{
    RefreshSecretManager, RotationEngine, SecurityNotifier, SessionStore, TokenCodec,
};
use authgate_db::PgSessionStore;
use authgate_events::WebhookNotifier;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use authgate_api::background::session_sweeper;
use authgate_api::config::ServerConfig;
use authgate_api::router::build_app_router;
use authgate_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });
    tracing::info!(
        host = %config.host,
        port = %config.port,
        token_ttl_secs = config.auth.token_ttl.num_seconds(),
        refresh_ttl_secs = config.auth.refresh_ttl.num_seconds(),
        trusted_proxies = config.trusted_proxies.len(),
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = authgate_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    authgate_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    authgate_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let store: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(pool));

    // --- Security alerts ---
    let mut delivery_handle = None;
    let notifier: Arc<dyn SecurityNotifier> = match config.auth.webhook_url.as_deref() {
        Some(url) => {
            let (notifier, handle) =
                WebhookNotifier::spawn(url).expect("Failed to build webhook client");
            delivery_handle = Some(handle);
            tracing::info!(url = %url, "Security alerts go to webhook");
            Arc::new(notifier)
        }
        None => {
            tracing::warn!("WEBHOOK_URL not set; security alerts are only logged");
            Arc::new(LogOnlyNotifier)
        }
    };

    // --- Rotation engine ---
    let engine = Arc::new(RotationEngine::new(
        TokenCodec::new(config.auth.jwt_secret.as_bytes()),
        RefreshSecretManager::new(),
        Arc::clone(&store),
        notifier,
        config.auth.rotation_settings(),
    ));

    // --- Session sweeper ---
    let sweep_cancel = CancellationToken::new();
    let sweep_handle = tokio::spawn(session_sweeper::run(
        Arc::clone(&store),
        Duration::from_secs(config.session_sweep_interval_secs),
        sweep_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        engine,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sweep_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), sweep_handle).await;
    tracing::info!("Session sweeper stopped");

    // The router (and with it the last notifier handle) is gone, so the
    // delivery task finishes once its queue is drained.
    if let Some(handle) = delivery_handle {
        let _ = tokio::time::timeout(Duration::from_secs(15), handle).await;
        tracing::info!("Security alert delivery stopped");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Install the global subscriber. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "authgate_api=debug,authgate_core=debug,authgate_events=debug,tower_http=debug".into()
    });

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
