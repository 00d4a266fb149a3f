//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command line (cli.rs) + optional TOML file (loader.rs)
//!     → ProxyConfig (schema.rs, raw values)
//!     → validation.rs (URL checks, mode selection)
//!     → ServeMode (validated, immutable)
//!     → shared via Arc with every request task
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Header lists are parsed leniently; malformed entries are dropped

pub mod cli;
pub mod headers;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use headers::HeaderSet;
pub use loader::ConfigError;
pub use schema::{ListenerConfig, ObservabilityConfig, ProxyConfig};
pub use validation::build_mode;
