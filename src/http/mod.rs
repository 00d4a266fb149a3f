//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, access log)
//!     → routing::Router picks Api | Primary | Static
//!     → proxy.rs (forward upstream) or files.rs (serve from disk)
//!     → response.rs (forced headers, error bodies)
//!     → Send to client
//! ```

pub mod files;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;
pub mod websocket;

pub use request::MakeRequestUuidV4;
pub use response::HeaderInjector;
pub use server::HttpServer;
