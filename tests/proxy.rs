//! End-to-end tests for proxy mode.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use wrc::config::HeaderSet;
use wrc::ProxyConfig;

mod common;

fn proxy_config(target: String) -> ProxyConfig {
    ProxyConfig {
        target: Some(target),
        ..ProxyConfig::default()
    }
}

#[tokio::test]
async fn test_primary_rewrites_path_and_host() {
    let backend = common::start_echo_backend().await;
    let (proxy, _shutdown) =
        common::start_proxy(proxy_config(format!("http://{}/v1", backend))).await;

    let res = common::client()
        .get(format!("http://{}/users?page=2", proxy))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["x-echo-host"], backend.to_string().as_str());
    assert_eq!(res.headers()["x-upstream"], "kept");
    assert_eq!(res.text().await.unwrap(), "GET /v1/users?page=2");
}

#[tokio::test]
async fn test_return_headers_on_every_response() {
    let backend = common::start_echo_backend().await;
    let mut config = proxy_config(format!("http://{}", backend));
    config.return_headers = HeaderSet::parse("X-Proxy: yes; X-Shared: return");
    config.forward_headers = HeaderSet::parse("X-Shared: forward; X-Label: r");
    let (proxy, _shutdown) = common::start_proxy(config).await;

    let client = common::client();
    for path in ["/", "/missing"] {
        let res = client
            .get(format!("http://{}{}", proxy, path))
            .send()
            .await
            .unwrap();

        assert_eq!(res.headers()["x-proxy"], "yes", "{}", path);
        assert_eq!(res.headers()["x-shared"], "return", "{}", path);
        assert_eq!(res.headers()["x-label"], "r", "{}", path);
    }
}

#[tokio::test]
async fn test_forward_headers_stay_on_response() {
    let backend = common::start_echo_backend().await;
    let mut config = proxy_config(format!("http://{}", backend));
    config.forward_headers = HeaderSet::parse("X-From: wrc");
    let (proxy, _shutdown) = common::start_proxy(config).await;

    let res = common::client()
        .get(format!("http://{}/", proxy))
        .send()
        .await
        .unwrap();

    // Upstream never sees it; the client does.
    assert_eq!(res.headers()["x-echo-from"], "none");
    assert_eq!(res.headers()["x-from"], "wrc");
}

#[tokio::test]
async fn test_api_prefix_routing() {
    let web = common::start_echo_backend().await;
    let api = common::start_echo_backend().await;
    let mut config = proxy_config(format!("http://{}", web));
    config.api = Some(format!("http://{}/backend", api));
    config.return_headers = HeaderSet::parse("X-Proxy: yes");
    let (proxy, _shutdown) = common::start_proxy(config).await;

    let client = common::client();

    let res = client
        .get(format!("http://{}/api/ping?x=1", proxy))
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-echo-host"], api.to_string().as_str());
    assert!(res.headers().get("x-proxy").is_none());
    assert_eq!(res.text().await.unwrap(), "GET /backend/ping?x=1");

    let res = client
        .post(format!("http://{}/home", proxy))
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-echo-host"], web.to_string().as_str());
    assert_eq!(res.headers()["x-proxy"], "yes");
    assert_eq!(res.text().await.unwrap(), "POST /home");
}

#[tokio::test]
async fn test_forwarded_for_and_request_id() {
    let backend = common::start_echo_backend().await;
    let (proxy, _shutdown) = common::start_proxy(proxy_config(format!("http://{}", backend))).await;

    let res = common::client()
        .get(format!("http://{}/", proxy))
        .header("x-forwarded-for", "203.0.113.9")
        .header("x-request-id", "req-42")
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["x-echo-forwarded-for"], "203.0.113.9, 127.0.0.1");
    assert_eq!(res.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_upstream_down_is_bad_gateway() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead = listener.local_addr().unwrap();
    drop(listener);

    let (proxy, _shutdown) = common::start_proxy(proxy_config(format!("http://{}", dead))).await;

    let res = common::client()
        .get(format!("http://{}/", proxy))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);
}

#[tokio::test]
async fn test_upgrade_is_tunnelled() {
    let backend = common::start_upgrade_backend().await;
    let mut config = proxy_config(format!("http://{}", backend));
    config.return_headers = HeaderSet::parse("X-Proxy: yes");
    let (proxy, _shutdown) = common::start_proxy(config).await;

    let mut socket = TcpStream::connect(proxy).await.unwrap();
    socket
        .write_all(
            b"GET /socket HTTP/1.1\r\n\
              Host: localhost\r\n\
              Connection: Upgrade\r\n\
              Upgrade: echo\r\n\r\n",
        )
        .await
        .unwrap();

    let head = common::read_head(&mut socket).await.to_ascii_lowercase();
    assert!(head.starts_with("http/1.1 101"), "{}", head);
    assert!(head.contains("x-proxy: yes"), "{}", head);

    socket.write_all(b"ping").await.unwrap();
    let mut buf = [0u8; 4];
    socket.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"ping");
}

#[tokio::test]
async fn test_shutdown_stops_server() {
    let backend = common::start_echo_backend().await;
    let (proxy, shutdown) = common::start_proxy(proxy_config(format!("http://{}", backend))).await;

    shutdown.trigger();
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    assert!(TcpStream::connect(proxy).await.is_err());
}
