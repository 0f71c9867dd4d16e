//! `sealed-records-host` — development host binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured logging (and OTLP export when configured).
//! 3. Instantiate the contract with its cipher primitive injected.
//! 4. Build the Axum router over an in-memory ledger and serve until Ctrl-C.

mod config;
mod server;
mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use contract::{Aes256GcmSiv, Contract, MemoryLedger};
use tracing::info;

use config::Config;
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        key_scheme = %cfg.key_scheme,
        legacy_decrypt_fallthrough = cfg.legacy_decrypt_fallthrough,
        "sealed-records host starting"
    );

    // -----------------------------------------------------------------------
    // 3. Contract
    // -----------------------------------------------------------------------
    let contract = Contract::new(Arc::new(Aes256GcmSiv::new()), cfg.contract_options());

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(contract, MemoryLedger::new());
    let router = server::router::build(state, Duration::from_secs(cfg.request_timeout_secs));

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutting down");
    telemetry::shutdown();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
