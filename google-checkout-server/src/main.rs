//! Google Checkout webhook host.
//!
//! Reads the merchant configuration from the TOML file named by `CHECKOUT_CONFIG`
//! (default `checkout.toml`) and listens on `HOST:PORT` (default `0.0.0.0:8080`).

#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from axum and reqwest"
)]

use std::sync::Arc;

use google_checkout::CheckoutConfig;
use google_checkout_server::{
    AppState, create_app,
    error::ServerError,
    handler::LoggingHandler,
    observability::{LogFormat, init_observability},
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    init_observability(LogFormat::from_env());

    let config_path =
        std::env::var("CHECKOUT_CONFIG").unwrap_or_else(|_| "checkout.toml".to_owned());
    let config = CheckoutConfig::from_file(&config_path).inspect_err(|e| {
        tracing::error!(path = %config_path, error = %e, "failed to load configuration");
    })?;

    let state = Arc::new(AppState::new(&config, LoggingHandler));
    let app = create_app(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_owned());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_owned());
    let addr = format!("{host}:{port}");

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, environment = %config.environment, "webhook host listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received, draining connections");
}
