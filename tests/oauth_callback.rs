//! End-to-end tests for the OAuth callback redirect.

use portfolio_guard::config::GuardConfig;
use reqwest::StatusCode;

mod common;

async fn location(server: &common::TestServer, query: &str) -> (StatusCode, String) {
    let res = common::client()
        .get(server.url(&format!("/auth/callback{}", query)))
        .header("sec-fetch-site", "cross-site")
        .send()
        .await
        .unwrap();
    let location = res
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    (res.status(), location)
}

#[tokio::test]
async fn test_callback_redirects_to_safe_next() {
    let server = common::start_server(GuardConfig::default()).await;

    let (status, loc) = location(&server, "?code=abc&next=%2Fadmin%2Farticles").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(loc, "/admin/articles");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_callback_rejects_open_redirects() {
    let server = common::start_server(GuardConfig::default()).await;

    for next in ["%2F%2Fevil.example", "https%3A%2F%2Fevil.example", "%2F%5Cevil.example"] {
        let (status, loc) = location(&server, &format!("?code=abc&next={}", next)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(loc, "/admin", "next={}", next);
    }

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_callback_without_code_goes_to_login() {
    let mut config = GuardConfig::default();
    config.auth.login_path = "/signin".into();
    let server = common::start_server(config).await;

    let (_, loc) = location(&server, "?next=%2Fadmin").await;
    assert_eq!(loc, "/signin?error=auth_callback");

    let (_, loc) = location(&server, "?code=abc&error=access_denied").await;
    assert_eq!(loc, "/signin?error=auth_callback");

    server.shutdown.trigger();
}
