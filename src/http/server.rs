//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with the dispatch handler
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener
//! - Dispatch each request to the API upstream, primary upstream or static root

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, Response, StatusCode},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::http::files;
use crate::http::proxy::{self, build_client, HttpClient};
use crate::http::request::{log_request, remote_addr, MakeRequestUuidV4};
use crate::http::response::text_response;
use crate::observability::metrics;
use crate::routing::{Route, Router as ProxyRouter, ServeMode};
use crate::security::access_control::Access;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ProxyRouter>,
    pub client: HttpClient,
}

/// HTTP server for the proxy / file server.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server serving `mode`.
    pub fn new(mode: ServeMode) -> Self {
        let state = AppState {
            router: Arc::new(ProxyRouter::new(mode)),
            client: build_client(),
        };

        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(dispatch_handler))
            .route("/{*path}", any(dispatch_handler))
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main handler. Logs the request, picks a route and runs it.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response<Body> {
    let start_time = Instant::now();
    let remote = remote_addr(&request);
    let method = request.method().clone();

    log_request(&request, remote);

    let route = state.router.select(&request);
    let label = route.label();

    let response = match route {
        Route::Api(api) => proxy::forward(&state.client, api, remote, request).await,
        Route::Primary(primary) => proxy::forward(&state.client, primary, remote, request).await,
        Route::Static(files_route) => match files_route.guard().check(request.uri().query()) {
            Access::Allow => files::serve(files_route, request).await,
            Access::Deny => {
                tracing::debug!(uri = %request.uri(), "Query token rejected");
                text_response(StatusCode::FORBIDDEN, "Forbidden")
            }
        },
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), label, start_time);
    response
}
