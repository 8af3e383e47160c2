mod config;
mod response;
mod server;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use draft_engine::Pipeline;
use draft_logging::draft_info;

use crate::config::AppConfig;
use crate::server::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    if !draft_logging::initialize(&config.log) {
        eprintln!("Warning: logging was not initialized");
    }
    draft_info!(
        "md2draft starting mode={} render={} platform={}",
        config.mode,
        config.render.base_url,
        config.platform.base_url
    );

    let pipeline = Pipeline::from_settings(config.engine_settings());
    let app = router(AppState::new(pipeline, config.render_api_key()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    draft_info!("Listening on {}", addr);
    draft_info!("Health check: http://localhost:{}/health", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    draft_info!("md2draft stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            draft_logging::draft_error!("Failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                draft_logging::draft_error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    draft_info!("Shutdown signal received, draining connections");
}
