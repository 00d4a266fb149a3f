//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (mode + prefix lookup)
//!     → matcher.rs (`/api` prefix check)
//!     → Return: Api | Primary | Static route
//!
//! Route Compilation (at startup):
//!     ProxyConfig
//!     → config::validation builds ServeMode
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route

pub mod matcher;
pub mod path;
pub mod route;
pub mod router;

pub use route::{ApiRoute, Director, PrimaryRoute, StaticRoute, UpstreamTarget};
pub use router::{Route, Router, ServeMode};
