use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use faceswap_api::background::fusion_jobs::{self, JobRegistry};
use faceswap_api::config::ServerConfig;
use faceswap_api::router::build_app_router;
use faceswap_api::state::AppState;
use faceswap_fusion::runner::FaceFusion;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "faceswap_api=debug,faceswap_fusion=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        create_url = %config.fusion.create_url,
        query_url = %config.fusion.query_url,
        output_dir = %config.fusion.output_dir.display(),
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = faceswap_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    faceswap_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    faceswap_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Output directory ---
    tokio::fs::create_dir_all(&config.fusion.output_dir)
        .await
        .expect("Failed to create output directory");

    // --- Fusion runner and job pollers ---
    let shutdown = CancellationToken::new();
    let fusion = Arc::new(FaceFusion::from_config(&config.fusion));
    let jobs = Arc::new(JobRegistry::new(shutdown.child_token()));

    let resumed = fusion_jobs::resume_active(&pool, &fusion, &jobs)
        .await
        .expect("Failed to resume unfinished fusion jobs");
    tracing::info!(resumed, "Fusion job pollers resumed");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        fusion,
        jobs: Arc::clone(&jobs),
        shutdown: shutdown.clone(),
    };

    // --- Router ---
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

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Interrupted pollers leave their jobs in `polling`; they resume on the
    // next start.
    let deadline = Duration::from_secs(config.shutdown_timeout_secs);
    let drained = tokio::time::timeout(deadline, async {
        while jobs.active_count().await > 0 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await;
    if drained.is_err() {
        let remaining = jobs.active_count().await;
        tracing::warn!(remaining, "Fusion job pollers still running at shutdown");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal, then cancel `shutdown`.
///
/// Cancelling the token stops background pollers and in-flight synchronous
/// face swaps, so open connections drain promptly. Handles both SIGINT
/// (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal(shutdown: CancellationToken) {
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

    shutdown.cancel();
}
