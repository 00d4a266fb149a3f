//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration into a serve mode
//! - Print the startup banner
//! - Start the metrics listener when configured
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::fmt::Write as _;
use std::net::SocketAddr;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::{build_mode, ConfigError, HeaderSet, ProxyConfig};
use crate::http::HttpServer;
use crate::observability::metrics;

/// Errors that stop the process before or while serving.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Bad configuration. Reported without the "failed to start" prefix.
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid metrics address `{0}`")]
    MetricsAddress(String),

    #[error(transparent)]
    Metrics(#[from] BuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Human-readable summary of what the process is about to serve.
pub fn banner(config: &ProxyConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Starting reverse proxy server on {}", config.listener.bind_address());
    let _ = writeln!(out, "Target: {}", config.target.as_deref().unwrap_or_default());
    if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
        let _ = writeln!(out, "Query Token: {}", token);
    }
    if let Some(api) = config.api.as_deref().filter(|a| !a.is_empty()) {
        let _ = writeln!(out, "API Endpoint: {}", api);
    }
    write_headers(&mut out, "Return to Client Headers", &config.return_headers);
    write_headers(&mut out, "Send to Target Headers", &config.forward_headers);
    let _ = writeln!(out, "\nLogs:");
    out
}

fn write_headers(out: &mut String, title: &str, headers: &HeaderSet) {
    if headers.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{}:", title);
    for (name, value) in headers.iter() {
        let _ = writeln!(out, "{} : {}", name, value);
    }
}

/// Validate `config`, then serve until `shutdown` fires.
pub async fn run(
    config: ProxyConfig,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), StartupError> {
    let mode = build_mode(&config)?;
    print!("{}", banner(&config));

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        target = config.target.as_deref().unwrap_or_default(),
        "Configuration loaded"
    );

    if let Some(addr) = config.observability.metrics_address.as_deref() {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|_| StartupError::MetricsAddress(addr.to_string()))?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    HttpServer::new(mode).run(listener, shutdown).await?;
    Ok(())
}
