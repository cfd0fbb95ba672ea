use std::process::ExitCode;

use clap::Parser;
use fxstat_web::{app, AppError, AppState, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "fxstat stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::parse();
    let state = AppState::new(config.build_router());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|source| AppError::Bind {
            addr: config.bind,
            source,
        })?;

    if !config.has_api_key() {
        tracing::warn!("EXCHANGE_RATE_API_KEY not set, serving from the fallback dataset only");
    }
    tracing::info!(
        addr = %config.bind,
        base_url = %config.base_url,
        fallback = %config.fallback_file.display(),
        deadline_ms = ?config.deadline_ms,
        "fxstat listening"
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Serve)
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
