//! Route lookup and dispatch.
//!
//! # Design Decisions
//! - Mode is fixed at startup and never changes (thread-safe without locks)
//! - The API route is only consulted in proxy mode
//! - Lookup is a single prefix check; no per-request allocation

use axum::body::Body;
use axum::http::Request;

use crate::routing::matcher::Matcher;
use crate::routing::route::{ApiRoute, PrimaryRoute, StaticRoute};

/// How the process serves traffic. Decided once from configuration.
#[derive(Debug, Clone)]
pub enum ServeMode {
    Proxy {
        primary: PrimaryRoute,
        api: Option<ApiRoute>,
    },
    Static(StaticRoute),
}

/// The route chosen for one request.
#[derive(Debug, Clone, Copy)]
pub enum Route<'a> {
    Api(&'a ApiRoute),
    Primary(&'a PrimaryRoute),
    Static(&'a StaticRoute),
}

impl Route<'_> {
    /// Label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Route::Api(_) => "api",
            Route::Primary(_) => "primary",
            Route::Static(_) => "static",
        }
    }
}

/// Immutable request router.
#[derive(Debug, Clone)]
pub struct Router {
    mode: ServeMode,
}

impl Router {
    pub fn new(mode: ServeMode) -> Self {
        Self { mode }
    }

    /// Pick the route for a request.
    pub fn select(&self, req: &Request<Body>) -> Route<'_> {
        match &self.mode {
            ServeMode::Proxy { primary, api } => match api {
                Some(api) if api.matcher().matches(req) => Route::Api(api),
                _ => Route::Primary(primary),
            },
            ServeMode::Static(route) => Route::Static(route),
        }
    }
}
