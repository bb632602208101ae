mod common;

use anyhow::Result;
use common::TestServer;
use reqwest::StatusCode;

#[tokio::test]
async fn intune_is_unavailable_without_graph_credentials() -> Result<()> {
    let server = TestServer::start().await?;
    let (status, body) = server.get("/api/intune/devices/by-serial/5CG1234XYZ").await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["statusCode"], 503);
    Ok(())
}

#[tokio::test]
async fn intune_inputs_are_validated_first() -> Result<()> {
    let server = TestServer::start().await?;
    let (status, _) = server.get("/api/intune/devices/not-a-guid").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = server.get("/api/intune/devices?search=it's").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
