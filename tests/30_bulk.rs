mod common;

use anyhow::Result;
use common::{laptop, TestServer};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn bulk_create_with_template_defaults() -> Result<()> {
    let server = TestServer::start().await?;
    let (status, template) = server
        .post(
            "/api/asset-templates",
            &json!({
                "templateName": "HP EliteBook standard",
                "category": "Laptop",
                "brand": "HP",
                "model": "EliteBook 840",
                "purchaseDate": "2025-01-15",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", template);

    let (status, result) = server
        .post(
            "/api/assets/bulk",
            &json!({
                "assetCodePrefix": "LAP",
                "category": "Laptop",
                "quantity": 3,
                "templateId": template["id"],
                "serialNumbers": ["HP-001", "HP-002", "HP-003"],
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", result);
    assert_eq!(result["createdCount"], 3);
    assert_eq!(result["failedCount"], 0);
    assert_eq!(result["created"][0]["assetCode"], "LAP-25-HP-00001");
    assert_eq!(result["created"][2]["assetCode"], "LAP-25-HP-00003");
    assert_eq!(result["created"][1]["model"], "EliteBook 840");
    Ok(())
}

#[tokio::test]
async fn bulk_with_only_failures_is_a_conflict() -> Result<()> {
    let server = TestServer::start().await?;
    server.post("/api/assets", &laptop("TAKEN-1")).await?;

    let (status, result) = server
        .post(
            "/api/assets/bulk",
            &json!({
                "assetCodePrefix": "LAP",
                "category": "Laptop",
                "brand": "Dell",
                "quantity": 1,
                "serialNumbers": ["TAKEN-1"],
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(result["createdCount"], 0);
    assert_eq!(result["failed"][0]["serialNumber"], "TAKEN-1");
    Ok(())
}

#[tokio::test]
async fn bulk_quantity_is_bounded() -> Result<()> {
    let server = TestServer::start().await?;
    let (status, body) = server
        .post(
            "/api/assets/bulk",
            &json!({ "assetCodePrefix": "LAP", "category": "Laptop", "quantity": 101 }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "quantity");
    Ok(())
}
