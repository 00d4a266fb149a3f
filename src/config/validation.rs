//! Configuration validation.
//!
//! Turns a raw [`ProxyConfig`] into the immutable [`ServeMode`]. A target
//! starting with `http://` or `https://` selects proxy mode; anything else is
//! treated as a directory to serve.

use std::path::Path;

use crate::config::loader::ConfigError;
use crate::config::schema::ProxyConfig;
use crate::http::response::HeaderInjector;
use crate::routing::{ApiRoute, PrimaryRoute, ServeMode, StaticRoute, UpstreamTarget};
use crate::security::access_control::AccessGuard;

/// Whether a target names an upstream rather than a directory.
pub fn is_upstream_url(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Validate the configuration and build the serve mode.
pub fn build_mode(config: &ProxyConfig) -> Result<ServeMode, ConfigError> {
    let target = non_empty(&config.target).ok_or(ConfigError::MissingTarget)?;

    if is_upstream_url(target) {
        let upstream = UpstreamTarget::parse(target)
            .map_err(|e| ConfigError::InvalidTarget(e.to_string()))?;
        let injector = HeaderInjector::new(&config.forward_headers, &config.return_headers);
        let primary = PrimaryRoute::new(upstream, injector);

        let api = match non_empty(&config.api) {
            Some(api) => {
                let upstream = UpstreamTarget::parse(api)
                    .map_err(|e| ConfigError::InvalidApi(e.to_string()))?;
                Some(ApiRoute::new(upstream))
            }
            None => None,
        };

        if non_empty(&config.token).is_some() {
            tracing::warn!("Query token only applies when serving files; ignoring it in proxy mode");
        }

        return Ok(ServeMode::Proxy { primary, api });
    }

    if non_empty(&config.api).is_some() {
        tracing::warn!("API endpoint only applies in proxy mode; ignoring it");
    }
    if !Path::new(target).is_dir() {
        tracing::warn!(root = %target, "Static root is not a directory");
    }

    let guard = AccessGuard::new(config.token.clone());
    Ok(ServeMode::Static(StaticRoute::new(target, guard)))
}
