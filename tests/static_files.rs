//! End-to-end tests for static mode.

use wrc::ProxyConfig;

mod common;

fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>welcome</h1>").unwrap();
    std::fs::create_dir(dir.path().join("docs")).unwrap();
    std::fs::write(dir.path().join("docs").join("guide.txt"), "read me").unwrap();
    dir
}

fn static_config(dir: &tempfile::TempDir, token: Option<&str>) -> ProxyConfig {
    ProxyConfig {
        target: Some(dir.path().to_str().unwrap().to_string()),
        token: token.map(str::to_string),
        ..ProxyConfig::default()
    }
}

#[tokio::test]
async fn test_serves_index_without_token() {
    let dir = site();
    let (proxy, _shutdown) = common::start_proxy(static_config(&dir, None)).await;

    let res = common::client()
        .get(format!("http://{}/", proxy))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "<h1>welcome</h1>");
}

#[tokio::test]
async fn test_token_gate() {
    let dir = site();
    let (proxy, _shutdown) = common::start_proxy(static_config(&dir, Some("secret"))).await;
    let client = common::client();

    for query in ["", "?token=wrong", "?token=Secret"] {
        let res = client
            .get(format!("http://{}/docs/guide.txt{}", proxy, query))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 403, "{}", query);
        assert_eq!(res.text().await.unwrap(), "Forbidden");
    }

    let res = client
        .get(format!("http://{}/docs/guide.txt?token=secret", proxy))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "read me");
}

#[tokio::test]
async fn test_directory_redirect_keeps_token() {
    let dir = site();
    let (proxy, _shutdown) = common::start_proxy(static_config(&dir, Some("secret"))).await;

    let res = common::client()
        .get(format!("http://{}/docs?token=secret", proxy))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 301);
    assert_eq!(res.headers()["location"], "docs/?token=secret");

    let res = common::client()
        .get(format!("http://{}/docs/?token=secret", proxy))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.text().await.unwrap().contains("<a href=\"guide.txt\">guide.txt</a>"));
}
