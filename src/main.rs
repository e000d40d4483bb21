// src/main.rs - Kitchen Line Service Entry Point
use std::{net::SocketAddr, time::Duration};

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use kitchen_line::{load_config, transport::create_router, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().unwrap_or_else(|err| {
        eprintln!("failed to load config ({err}), using defaults");
        AppConfig::default()
    });

    init_tracing(&config);

    info!("starting kitchen-line v{}", env!("CARGO_PKG_VERSION"));
    info!(
        host = %config.server.host,
        port = config.server.port,
        retention_days = config.orders.retention_days,
        "configuration loaded"
    );

    let state = AppState::new(config.clone());
    spawn_retention_sweeper(state.clone());

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;
    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!("server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins when set; otherwise the configured level applies.
fn log_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn init_tracing(config: &AppConfig) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(log_filter(&config.logging.level))
        .with_target(false);

    if config.logging.format == "json" {
        subscriber.json().init();
    } else {
        subscriber.pretty().init();
    }
}

/// Periodically removes orders older than the retention horizon.
fn spawn_retention_sweeper(state: AppState) {
    let interval = Duration::from_secs(state.config.orders.sweep_interval_secs);
    let horizon = ChronoDuration::days(i64::from(state.config.orders.retention_days));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // first tick fires immediately; skip it
        loop {
            ticker.tick().await;
            match state.store.sweep_expired(Utc::now() - horizon).await {
                Ok(removed) if removed > 0 => {
                    info!(removed, "retention sweep complete");
                }
                Ok(_) => {}
                Err(err) => error!(error = %err, "retention sweep failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => warn!(error = %err, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received, shutting down gracefully");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_falls_back_to_configured_level() {
        std::env::remove_var("RUST_LOG");
        let filter = log_filter("debug");
        assert_eq!(filter.to_string(), "debug");
    }
}
