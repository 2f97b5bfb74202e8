//! carbon-registry daemon
//!
//! - Syslog UDP listener -> unbounded queue -> single ingestion worker
//! - HTTP: /v1/dump (pretty | plain), /metrics
//! - Config path: first CLI argument, default `carbon-registry.yaml`

use std::future::IntoFuture;
use std::process::ExitCode;

use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, EnvFilter};

use carbon_registry_core::error::{RegistryError, Result};
use carbon_registry_server::{app_state, config, ingest, router, transport};

const DEFAULT_CONFIG_PATH: &str = "carbon-registry.yaml";

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.kind().as_str(), "carbon-registry stopped: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_from_file(&path)?;
    let http_addr = cfg.http.listen_addr()?;
    let syslog_addr = cfg.syslog.listen_addr()?;
    let max_datagram_bytes = cfg.syslog.max_datagram_bytes;

    let state = app_state::AppState::new(cfg);
    let (tx, rx) = mpsc::unbounded_channel();

    // Purge happens inside `listen` before the first record; a failure ends `run`.
    let mut ingest_task = tokio::spawn(ingest::listen(state.ingestor(), rx));

    let socket = UdpSocket::bind(syslog_addr)
        .await
        .map_err(|e| RegistryError::Internal(format!("bind syslog {syslog_addr}: {e}")))?;
    tokio::spawn(transport::syslog::run(socket, tx, state.metrics(), max_datagram_bytes));

    let listener = TcpListener::bind(http_addr)
        .await
        .map_err(|e| RegistryError::Internal(format!("bind http {http_addr}: {e}")))?;
    tracing::info!(%http_addr, %syslog_addr, "carbon-registry starting");

    let app = router::build_router(state);
    tokio::select! {
        served = axum::serve(listener, app).into_future() => {
            served.map_err(|e| RegistryError::Internal(format!("http server failed: {e}")))
        }
        ingested = &mut ingest_task => {
            match ingested {
                Ok(Ok(_)) => Err(RegistryError::Internal("ingestion worker exited".into())),
                Ok(Err(e)) => Err(e),
                Err(e) => Err(RegistryError::Internal(format!("ingestion worker panicked: {e}"))),
            }
        }
    }
}
