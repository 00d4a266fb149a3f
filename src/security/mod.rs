//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Static mode:
//!     → access_control.rs (query token check)
//!
//! Proxy mode:
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-For)
//! ```

pub mod access_control;
pub mod headers;
