mod common;

use anyhow::Result;
use asset_inventory::auth::{issue_dev_token, Claims};
use common::{read, TestServer, DEV_SECRET};
use reqwest::StatusCode;

#[tokio::test]
async fn protected_routes_require_a_bearer_token() -> Result<()> {
    let server = TestServer::with_auth().await?;

    let (status, body) = server.get("/api/assets").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["statusCode"], 401);

    let res = server
        .client
        .get(server.url("/api/assets"))
        .bearer_auth("not.a.token")
        .send()
        .await?;
    let (status, body) = read(res).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired bearer token");

    let (status, _) = server.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn valid_token_is_accepted() -> Result<()> {
    let server = TestServer::with_auth().await?;
    let token = issue_dev_token(DEV_SECRET, &Claims::development("it@example.com", Some("IT"), 1))?;

    let res = server
        .client
        .get(server.url("/api/assets"))
        .bearer_auth(&token)
        .send()
        .await?;
    let (status, body) = read(res).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["totalCount"], 0);
    Ok(())
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() -> Result<()> {
    let server = TestServer::with_auth().await?;
    let token = issue_dev_token("some-other-secret", &Claims::development("x@example.com", None, 1))?;

    let res = server
        .client
        .get(server.url("/api/lease-contracts"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
