//! Portal Shell headless server entry point.

use std::error::Error;
use std::net::SocketAddr;

use portalshell_server::config::ServerConfig;
use portalshell_server::routes;
use portalshell_server::state::AppState;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Portal Shell server");

    let config = ServerConfig::from_env()?;

    let (app_state, shell_task) = AppState::start(config.shell.clone(), config.start_address.clone());
    let shell = app_state.shell.clone();

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("invalid HOST:PORT combination: {e}"))?;
    tracing::info!(%addr, start = %config.start_address, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    match shell.shutdown().await {
        Ok(cancelled) => tracing::info!(cancelled, "shell torn down"),
        Err(err) => tracing::warn!(error = %err, "shell already stopped"),
    }
    shell_task.await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
