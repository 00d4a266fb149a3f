//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{HeaderValue, Request, Response, StatusCode};
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use wrc::config::build_mode;
use wrc::{HttpServer, ProxyConfig, Shutdown};

/// Start the proxy on an ephemeral port. Keep the returned `Shutdown` alive
/// for as long as the server should run.
pub async fn start_proxy(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let mode = build_mode(&config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = HttpServer::new(mode).run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Start a backend that describes the request it received.
///
/// Body: `<METHOD> <path?query>`. Headers: `x-echo-host`,
/// `x-echo-forwarded-for`, `x-echo-from` (the `x-from` request header, or
/// `none`), plus `x-shared: upstream` and `x-upstream: kept`. `/missing`
/// answers 404.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(echo);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn echo(request: Request<Body>) -> Response<Body> {
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    let header = |name: &str| {
        request
            .headers()
            .get(name)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("none"))
    };

    let mut response = Response::new(Body::from(format!("{} {}", request.method(), target)));
    if request.uri().path() == "/missing" {
        *response.status_mut() = StatusCode::NOT_FOUND;
    }
    let headers = response.headers_mut();
    headers.insert("x-echo-host", header("host"));
    headers.insert("x-echo-forwarded-for", header("x-forwarded-for"));
    headers.insert("x-echo-from", header("x-from"));
    headers.insert("x-shared", HeaderValue::from_static("upstream"));
    headers.insert("x-upstream", HeaderValue::from_static("kept"));
    response
}

/// Start a raw TCP backend that accepts any upgrade and echoes bytes back.
pub async fn start_upgrade_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = read_head(&mut socket).await;
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 101 Switching Protocols\r\n\
                          Connection: upgrade\r\n\
                          Upgrade: echo\r\n\r\n",
                    )
                    .await;
                let (mut reader, mut writer) = socket.split();
                let _ = tokio::io::copy(&mut reader, &mut writer).await;
            });
        }
    });
    addr
}

/// Read an HTTP message head (up to and including the blank line).
pub async fn read_head(socket: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match socket.read(&mut byte).await {
            Ok(0) | Err(_) => break,
            Ok(_) => head.push(byte[0]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// HTTP client that never follows redirects or uses system proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
