//! Configuration schema definitions.
//!
//! `ProxyConfig` is the raw, unvalidated settings as they come from the command
//! line and the optional TOML file. Validation turns it into a
//! [`ServeMode`](crate::routing::ServeMode).

use serde::{Deserialize, Serialize};

use crate::config::headers::HeaderSet;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Upstream URL (`http://` / `https://`) or a directory to serve.
    pub target: Option<String>,

    /// Secondary upstream for paths under `/api`.
    pub api: Option<String>,

    /// Query token required in static mode.
    pub token: Option<String>,

    /// Headers returned to the client (`-a-header`).
    #[serde(rename = "a_header")]
    pub return_headers: HeaderSet,

    /// Headers labelled "send to target" (`-r-header`). Applied to the
    /// response as well; never sent upstream.
    #[serde(rename = "r_header")]
    pub forward_headers: HeaderSet,

    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Port to listen on. Kept as a string; invalid values fail at bind time.
    pub port: String,
}

impl ListenerConfig {
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: "8080".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Prometheus listener address (e.g., "127.0.0.1:9100"). Disabled when unset.
    pub metrics_address: Option<String>,

    /// Fallback `tracing` filter when `RUST_LOG` is not set.
    pub log_filter: Option<String>,
}
