//! Upstream forwarding.
//!
//! # Responsibilities
//! - Prepare the outbound request (hop-by-hop stripping, X-Forwarded-For)
//! - Hand the request to the route's [`Director`] for retargeting
//! - Send it through the shared client and relay the response
//! - Map transport failures to 502 Bad Gateway
//!
//! # Design Decisions
//! - Bodies are streamed in both directions, never buffered
//! - No retries: one attempt per request
//! - Outbound requests are always HTTP/1.1

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode, Version};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::http::response::{status_response, text_response};
use crate::http::websocket;
use crate::observability::metrics;
use crate::routing::Director;
use crate::security::headers::{
    append_forwarded_for, restore_upgrade, strip_hop_by_hop, upgrade_type,
};

/// Pooled client shared by every request. Speaks both `http` and `https`.
pub type HttpClient = Client<HttpsConnector<HttpConnector>, Body>;

pub fn build_client() -> HttpClient {
    let mut http = HttpConnector::new();
    http.enforce_http(false);

    let https = HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .wrap_connector(http);
    Client::builder(TokioExecutor::new()).build(https)
}

/// Forward `request` to the upstream chosen by `director`.
pub async fn forward<D: Director>(
    client: &HttpClient,
    director: &D,
    remote: Option<SocketAddr>,
    mut request: Request<Body>,
) -> Response<Body> {
    let upgrade = upgrade_type(request.headers());
    let client_upgrade = upgrade.as_ref().map(|_| hyper::upgrade::on(&mut request));

    let headers = request.headers_mut();
    strip_hop_by_hop(headers);
    if let Some(protocol) = upgrade.clone() {
        restore_upgrade(headers, protocol);
    }
    if let Some(addr) = remote {
        append_forwarded_for(headers, addr.ip());
    }
    *request.version_mut() = Version::HTTP_11;

    director.rewrite(&mut request);
    tracing::debug!(
        route = director.name(),
        uri = %request.uri(),
        "Forwarding request"
    );

    let mut response = match client.request(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(
                route = director.name(),
                upstream = %director.target(),
                error = %e,
                "Upstream request failed"
            );
            metrics::record_upstream_error(director.name());
            return status_response(StatusCode::BAD_GATEWAY);
        }
    };

    if response.status() == StatusCode::SWITCHING_PROTOCOLS {
        let accepted = upgrade_type(response.headers());
        let matches = match (&upgrade, &accepted) {
            (Some(requested), Some(accepted)) => requested
                .as_bytes()
                .eq_ignore_ascii_case(accepted.as_bytes()),
            _ => false,
        };
        let Some(client_upgrade) = client_upgrade.filter(|_| matches) else {
            tracing::error!(
                route = director.name(),
                requested = ?upgrade,
                accepted = ?accepted,
                "Upstream switched to a protocol the client did not ask for"
            );
            return text_response(StatusCode::BAD_GATEWAY, "Bad Gateway");
        };

        director.inject_headers(response.headers_mut());
        websocket::tunnel(client_upgrade, hyper::upgrade::on(&mut response));
        return response.map(Body::new);
    }

    strip_hop_by_hop(response.headers_mut());
    director.inject_headers(response.headers_mut());
    response.map(Body::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::HeaderInjector;
    use crate::config::HeaderSet;
    use crate::routing::{PrimaryRoute, UpstreamTarget};

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        // Bind and drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let route = PrimaryRoute::new(
            UpstreamTarget::parse(&format!("http://{}", addr)).unwrap(),
            HeaderInjector::new(&HeaderSet::default(), &HeaderSet::parse("X-Proxy: yes")),
        );
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = forward(&build_client(), &route, None, request).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(response.headers().get("x-proxy").is_none());
    }
}
