// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

mod app;
mod arbiter;
mod chain;
mod contract;
mod era;
mod error;
mod logging;
mod metrics;
mod report;
mod reporter;
mod routes;
mod secrets;
mod stash;
mod state;
mod submit;
mod watchdog;

use chain::{ParachainClient, RelayClient};
use contract::OracleMaster;
use ethers::providers::Middleware;
use oracle_daemon_config::DaemonConfig;
use reporter::{Reporter, ReporterHandle};
use secrets::OracleSigner;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Notify, watch};
use watchdog::Watchdog;

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] oracle_daemon_config::ConfigError),

    #[error(transparent)]
    Logging(#[from] logging::LoggingError),

    #[error(transparent)]
    Secret(#[from] secrets::SecretError),

    #[error(transparent)]
    Chain(#[from] error::ChainError),

    #[error("failed to read ABI file at {path}: {source}")]
    AbiIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse ABI file at {path}: {source}")]
    AbiParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid contract address '{0}'")]
    InvalidAddress(String),

    #[error("failed to determine parachain chain id: {0}")]
    ChainId(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("reporter exited with a fatal condition: {0}")]
    ReporterFatal(#[from] error::SkewFatal),

    #[error("reporter task panicked: {0}")]
    ReporterPanicked(String),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = DaemonConfig::from_env()?;
    logging::init(&config.log.level)?;

    if config.health.has_conflicting_metrics_port() {
        tracing::warn!(
            configured = config.health.prometheus_metrics_port,
            served = config.health.port,
            "PROMETHEUS_METRICS_PORT differs from REST_API_SERVER_PORT, ignoring it: \
             /metrics is served from the same listener as /healthcheck"
        );
    }
    metrics::init();

    let oracle = &config.oracle;

    let contract_address: ethers::types::Address = oracle
        .contract_address
        .parse()
        .map_err(|_| StartupError::InvalidAddress(oracle.contract_address.clone()))?;

    let abi_json = std::fs::read_to_string(&oracle.abi_path).map_err(|source| StartupError::AbiIo {
        path: oracle.abi_path.clone(),
        source,
    })?;
    let abi: ethers::abi::Abi =
        serde_json::from_str(&abi_json).map_err(|source| StartupError::AbiParse {
            path: oracle.abi_path.clone(),
            source,
        })?;

    tracing::info!(url = %oracle.ws_url_relay, "connecting to relay chain");
    let relay = RelayClient::connect(
        &oracle.ws_url_relay,
        oracle.reconnect_initial_delay_ms,
        oracle.reconnect_max_delay_ms,
        oracle.reconnect_request_timeout_ms,
    )
    .await?;

    let chain_id = probe_chain_id(&oracle.ws_url_para).await?;
    let signer = OracleSigner::load(&oracle.key_source, chain_id)?;
    tracing::info!(address = ?signer.address(), "oracle signer loaded");

    tracing::info!(url = %oracle.ws_url_para, "connecting to parachain");
    let parachain = ParachainClient::connect(&oracle.ws_url_para, &signer).await?;

    let oracle_master = OracleMaster::new(contract_address, abi);

    let handle = ReporterHandle::new();
    let (era_advance_tx, era_advance_rx) = watch::channel(tokio::time::Instant::now().into_std());

    let watchdog = Watchdog::new(oracle.era_duration_in_seconds);
    let reconnect_signal = watchdog.reconnect_signal();

    let reporter = Reporter::new(
        oracle.clone(),
        relay,
        parachain,
        oracle_master,
        signer,
        handle.clone(),
        era_advance_tx,
    );

    let shutdown = Arc::new(Notify::new());
    let http_shutdown = shutdown.clone();
    let watchdog_shutdown = shutdown.clone();
    let reporter_shutdown = shutdown.clone();

    let app_state = AppState::new(handle);
    let app = app::create_app(app_state);
    let addr = SocketAddr::new(config.health.bind_host.parse().unwrap_or([0, 0, 0, 0].into()), config.health.port);
    tracing::info!(%addr, "starting healthcheck/metrics server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let http_task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                http_shutdown.notified().await;
            })
            .await
    });

    let watchdog_task = tokio::spawn(watchdog.run(era_advance_rx, watchdog_shutdown));
    let mut reporter_task = tokio::spawn(reporter.run(reporter_shutdown, reconnect_signal));

    let reporter_outcome = tokio::select! {
        _ = wait_for_shutdown_signal() => {
            tracing::info!("shutdown signal received, notifying tasks");
            shutdown.notify_waiters();
            reporter_task.await
        }
        result = &mut reporter_task => {
            tracing::warn!("reporter exited before an external shutdown signal, notifying remaining tasks");
            shutdown.notify_waiters();
            result
        }
    };

    let _ = http_task.await;
    let _ = watchdog_task.await;

    match reporter_outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(fatal)) => {
            tracing::error!(reason = %fatal, "reporter exited with fatal condition");
            Err(StartupError::ReporterFatal(fatal))
        }
        Err(e) => {
            tracing::error!(error = %e, "reporter task panicked");
            Err(StartupError::ReporterPanicked(e.to_string()))
        }
    }
}

async fn probe_chain_id(url: &str) -> Result<u64, StartupError> {
    if url.starts_with("ws") {
        let provider = ethers::providers::Provider::<ethers::providers::Ws>::connect(url)
            .await
            .map_err(|e| StartupError::ChainId(e.to_string()))?;
        let id = provider
            .get_chainid()
            .await
            .map_err(|e| StartupError::ChainId(e.to_string()))?;
        Ok(id.as_u64())
    } else {
        let provider = ethers::providers::Provider::<ethers::providers::Http>::try_from(url)
            .map_err(|e| StartupError::ChainId(e.to_string()))?;
        let id = provider
            .get_chainid()
            .await
            .map_err(|e| StartupError::ChainId(e.to_string()))?;
        Ok(id.as_u64())
    }
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
