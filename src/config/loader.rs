//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// Errors that prevent the server from starting.
///
/// All of these are reported on stdout and end the process cleanly.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `<host/path>` argument was given.
    #[error("Use -h to get help")]
    MissingTarget,

    /// The primary upstream URL did not parse.
    #[error("Invalid host URL: {0}")]
    InvalidTarget(String),

    /// The `-api` URL did not parse.
    #[error("Invalid API URL: {0}")]
    InvalidApi(String),

    /// The config file could not be read.
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`ProxyConfig`].
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ProxyConfig = toml::from_str(&content)?;
    Ok(config)
}
