//! Reverse proxy and token-gated static file server.
//!
//! A process runs in exactly one mode, chosen at startup:
//! - proxy: every request goes to one upstream, except `/api...` which goes to
//!   an optional second upstream with the prefix removed
//! - static: files are served from a directory, optionally behind `?token=`

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
