//! Directory Cache server
//!
//! Runs the named caches, warms them from the directory backend and serves
//! the admin API.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use directory_cache::{
    create_router, AppState, CacheRuntime, Config, ReqwestTransport, RestDirectorySource,
};

/// Startup sequence:
/// 1. Initialize tracing
/// 2. Load configuration from environment variables
/// 3. Build the backend data source and the cache runtime
/// 4. Start warmup and periodic cleanup in the background
/// 5. Serve the admin API until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "directory_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Directory Cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, cleanup_interval={}s, backend={}, sizes general={} business={} search={} ai={}",
        config.server_port,
        config.cleanup_interval,
        config.backend_url,
        config.general.max_size,
        config.business.max_size,
        config.search.max_size,
        config.ai.max_size
    );

    let transport = ReqwestTransport::new(config.backend_url.clone(), config.backend_timeout())?;
    let source = Arc::new(RestDirectorySource::new(transport));

    let mut runtime = CacheRuntime::new(&config, source);
    runtime.start();

    let app = create_router(AppState::from_runtime(&runtime));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Admin API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    runtime.stop();
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
