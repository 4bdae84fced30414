use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use user_service_axum::UserService;

/// Listener address from `HOST` and `PORT`, defaulting to `0.0.0.0:8000`
pub(crate) fn listen_addr() -> Result<SocketAddr, Box<dyn std::error::Error>> {
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let addr = format!("{host}:{port}")
        .parse::<SocketAddr>()
        .map_err(|e| format!("Invalid HOST/PORT {host}:{port}: {e}"))?;
    Ok(addr)
}

pub(crate) async fn serve(
    addr: SocketAddr,
    app: Router,
    service: UserService,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    service.close().await;
    tracing::info!("Server stopped, storage pool closed");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }
}

/// `RUST_LOG` wins; otherwise `LOG_LEVEL` sets the level for everything
pub(crate) fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        tracing_subscriber::EnvFilter::try_new(level.to_lowercase())
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("You can increase verbosity by setting the RUST_LOG environment variable.");
    tracing::info!("Example: RUST_LOG=user_service=debug,info ./user-server");
}
