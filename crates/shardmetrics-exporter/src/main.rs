//! shardmetrics exporter
//!
//! - `GET /metrics` serves the flushed snapshot as Prometheus text
//! - `PUT /v1/toggles` flips the runtime recording toggles
//! - `POST /v1/completions` feeds completed operations into the recorder
//! - flush on scrape, or on a fixed interval

use std::net::SocketAddr;
use std::process::ExitCode;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

use shardmetrics_exporter::{app_state, config, flush, router};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = config::config_path();
    let cfg = match config::load_from_file(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(%path, code = e.code().as_str(), error = %e, "config rejected");
            return ExitCode::FAILURE;
        }
    };
    let listen: SocketAddr = match cfg.exporter.listen.parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::warn!(listen = %cfg.exporter.listen, error = %e, "exporter.listen is not a socket address");
            return ExitCode::FAILURE;
        }
    };
    let flush_mode = cfg.exporter.flush_mode;
    let flush_period = Duration::from_millis(cfg.exporter.flush_interval_ms);

    let state = match app_state::AppState::new(cfg) {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!(code = e.code().as_str(), error = %e, "engine setup failed");
            return ExitCode::FAILURE;
        }
    };

    let flush_task = match flush_mode {
        config::FlushMode::Interval => Some(flush::spawn_flush_task(state.clone(), flush_period)),
        config::FlushMode::Scrape => None,
    };

    let app = router::build_router(state);

    tracing::info!(%listen, ?flush_mode, "shardmetrics-exporter starting");
    let listener = match tokio::net::TcpListener::bind(listen).await {
        Ok(l) => l,
        Err(e) => {
            tracing::warn!(%listen, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some(task) = flush_task {
        task.abort();
    }

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::warn!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install signal handler");
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
    tracing::info!("signal received, starting graceful shutdown");
}
