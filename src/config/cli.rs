//! Command-line interface.
//!
//! Flags are accepted in both `--port 9000` and the single-dash `-port 9000` /
//! `-port=9000` forms. Values given on the command line override the config
//! file.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::config::headers::HeaderSet;
use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::ProxyConfig;

/// Long flags that may be written with a single dash.
const LONG_FLAGS: &[&str] = &[
    "api",
    "a-header",
    "r-header",
    "port",
    "token",
    "config",
    "metrics-addr",
    "help",
];

#[derive(Debug, Parser)]
#[command(name = "wrc")]
#[command(about = "Reverse proxy or token-gated static file server", long_about = None)]
#[command(override_usage = "wrc [options] <host/path>")]
pub struct Cli {
    /// API endpoint, receives requests under /api
    #[arg(long, value_name = "URL")]
    pub api: Option<String>,

    /// Headers returned to the client ("Name: Value; ...")
    #[arg(long = "a-header", value_name = "HEADERS")]
    pub a_header: Option<String>,

    /// Headers labelled for the target, applied to the response ("Name: Value; ...")
    #[arg(long = "r-header", value_name = "HEADERS")]
    pub r_header: Option<String>,

    /// Port to listen on [default: 8080]
    #[arg(long)]
    pub port: Option<String>,

    /// Query token required in static mode (?token=xxx)
    #[arg(long)]
    pub token: Option<String>,

    /// TOML config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address for the Prometheus metrics listener
    #[arg(long = "metrics-addr", value_name = "ADDR")]
    pub metrics_address: Option<String>,

    /// Upstream URL (http:// or https://) or directory to serve
    #[arg(value_name = "host/path")]
    pub target: Option<String>,
}

impl Cli {
    /// Parse the process arguments.
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Merge the optional config file with command-line values.
    pub fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(target) = self.target {
            config.target = Some(target);
        }
        if let Some(api) = self.api {
            config.api = Some(api);
        }
        if let Some(token) = self.token {
            config.token = Some(token);
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(headers) = self.a_header {
            config.return_headers = HeaderSet::parse(&headers);
        }
        if let Some(headers) = self.r_header {
            config.forward_headers = HeaderSet::parse(&headers);
        }
        if let Some(addr) = self.metrics_address {
            config.observability.metrics_address = Some(addr);
        }

        config.api = config.api.filter(|v| !v.is_empty());
        config.token = config.token.filter(|v| !v.is_empty());
        Ok(config)
    }
}

/// Rewrite `-flag` / `-flag=value` into `--flag` / `--flag=value` for known
/// long flags. Everything after a bare `--` is left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let Some(s) = arg.to_str() else {
                return arg;
            };
            if s == "--" {
                passthrough = true;
                return arg;
            }
            match s.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split('=').next().unwrap_or(rest);
                    if LONG_FLAGS.contains(&name) {
                        OsString::from(format!("-{}", s))
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}
