mod common;

use anyhow::Result;
use asset_inventory::config::{AppConfig, RateLimitPolicy};
use common::TestServer;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn general_policy_rejects_with_retry_after() -> Result<()> {
    let mut config = AppConfig::development();
    config.api.general_limit = RateLimitPolicy::new("general", 2, 60, 0);
    let server = TestServer::with_config(config).await?;

    for _ in 0..2 {
        let (status, _) = server.get("/api/asset-templates").await?;
        assert_eq!(status, StatusCode::OK);
    }

    let res = server.client.get(server.url("/api/asset-templates")).send().await?;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = res.headers()["retry-after"].to_str()?.parse()?;
    assert!((1..=60).contains(&retry_after));
    let body: serde_json::Value = res.json().await?;
    assert_eq!(body["statusCode"], 429);
    assert_eq!(body["error"], "Too many requests. Please try again later.");
    assert_eq!(body["retryAfterSeconds"], retry_after);

    // Public routes and other policies are unaffected.
    let (status, _) = server.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn disabled_rate_limiting_lets_everything_through() -> Result<()> {
    let mut config = AppConfig::development();
    config.api.enable_rate_limiting = false;
    config.api.general_limit = RateLimitPolicy::new("general", 1, 60, 0);
    let server = TestServer::with_config(config).await?;

    for _ in 0..3 {
        let (status, _) = server.get("/api/lease-contracts").await?;
        assert_eq!(status, StatusCode::OK);
    }
    Ok(())
}

#[tokio::test]
async fn rotating_forwarded_for_does_not_reset_the_window() -> Result<()> {
    let mut config = AppConfig::development();
    config.api.general_limit = RateLimitPolicy::new("general", 2, 60, 0);
    let server = TestServer::with_config(config).await?;

    let mut statuses = Vec::new();
    for i in 0..10 {
        let res = server
            .client
            .get(server.url("/api/asset-templates"))
            .header("x-forwarded-for", format!("10.0.0.{i}"))
            .header("x-real-ip", format!("10.1.0.{i}"))
            .send()
            .await?;
        statuses.push(res.status());
    }
    assert_eq!(&statuses[..2], &[StatusCode::OK, StatusCode::OK]);
    assert!(statuses[2..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
    Ok(())
}

#[tokio::test]
async fn trusted_proxy_gets_one_window_per_forwarded_client() -> Result<()> {
    let mut config = AppConfig::development();
    config.api.general_limit = RateLimitPolicy::new("general", 1, 60, 0);
    config.api.trusted_proxies = vec!["127.0.0.1".parse()?];
    let server = TestServer::with_config(config).await?;

    for client in ["198.51.100.1", "198.51.100.2"] {
        let res = server
            .client
            .get(server.url("/api/asset-templates"))
            .header("x-forwarded-for", client)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let repeat = server
        .client
        .get(server.url("/api/asset-templates"))
        .header("x-forwarded-for", "198.51.100.1")
        .send()
        .await?;
    assert_eq!(repeat.status(), StatusCode::TOO_MANY_REQUESTS);
    Ok(())
}

#[tokio::test]
async fn bulk_policy_is_counted_separately_from_general() -> Result<()> {
    let mut config = AppConfig::development();
    config.api.bulk_limit = RateLimitPolicy::new("bulk", 1, 60, 0);
    config.api.general_limit = RateLimitPolicy::new("general", 2, 60, 0);
    let server = TestServer::with_config(config).await?;

    let bulk = json!({
        "assetCodePrefix": "LAP",
        "category": "Laptop",
        "brand": "Dell",
        "quantity": 1,
    });
    let (status, body) = server.post("/api/assets/bulk", &bulk).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let (status, body) = server.post("/api/assets/bulk", &bulk).await?;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["statusCode"], 429);

    for _ in 0..2 {
        let (status, _) = server.get("/api/asset-templates").await?;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = server.get("/api/asset-templates").await?;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    Ok(())
}

#[tokio::test]
async fn external_policy_is_counted_separately_from_general() -> Result<()> {
    let mut config = AppConfig::development();
    config.api.external_limit = RateLimitPolicy::new("external", 1, 60, 0);
    config.api.general_limit = RateLimitPolicy::new("general", 1, 60, 0);
    let server = TestServer::with_config(config).await?;

    // Graph is not configured in tests, so an admitted call is a 503.
    let (status, _) = server.get("/api/intune/devices?search=LAP").await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let (status, _) = server.get("/api/intune/devices?search=LAP").await?;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, _) = server.get("/api/asset-templates").await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server.get("/api/asset-templates").await?;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, _) = server.get("/api/intune/devices/by-serial/SN-1").await?;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    Ok(())
}
